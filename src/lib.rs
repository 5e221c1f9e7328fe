//! CineGraph - movie discovery in the terminal
//!
//! Search titles as you type, browse what's trending, see where a title
//! streams in your country and find similar titles.
//!
//! # Modules
//!
//! - `models` - Titles, availability offers, regions
//! - `api` - Catalog clients (metadata service, TMDB)
//! - `session` - Debounced search, per-channel staleness, detail aggregation, region handling
//! - `config` - Config file and environment overrides
//! - `cli` / `commands` - Scriptable command line
//! - `app` / `ui` - Interactive TUI

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use models::{
    AvailabilityOffer, Genre, OfferCategory, Recommendations, Region, StreamingAvailability,
    Title, TitleSummary,
};

pub use api::{ApiError, BackendClient, CatalogApi, TmdbClient};
pub use app::{App, AppState};
pub use config::Config;
pub use session::{DetailView, SessionController, Status};
