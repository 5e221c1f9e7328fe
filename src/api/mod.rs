//! Catalog clients for the remote metadata service
//!
//! - `CatalogApi`: the async seam the session controller consumes
//! - `BackendClient`: CineGraph's `/api` metadata service
//! - `TmdbClient`: direct TMDB adapter, shaped like the service's responses

pub mod backend;
pub mod catalog;
pub mod tmdb;

pub use backend::BackendClient;
pub use catalog::{ApiError, ApiResult, CatalogApi, ErrorInfo, ErrorKind};
pub use tmdb::TmdbClient;
