//! Catalog trait and error taxonomy shared by every client

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::{Region, StreamingAvailability, Title, TitleSummary};

/// Catalog request failures
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("Unauthorized (401): check the API key")]
    Unauthorized,

    #[error("Rate limited (429), retries exhausted")]
    RateLimited,

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ApiError {
    /// Map a non-success HTTP status into the taxonomy
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            other => ApiError::Status(other.as_u16()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ApiError::RateLimited | ApiError::Status(_) | ApiError::Request(_) => ErrorKind::Network,
        }
    }
}

/// Coarse error class kept in channel state after the error itself is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidResponse,
    Network,
}

/// What presentation sees of a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ApiError> for ErrorInfo {
    fn from(error: &ApiError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Remote metadata service consumed by the session controller.
///
/// Implementations must be cheap to share: the controller holds one behind an
/// `Arc` and calls it from spawned tasks.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search titles. A blank query yields an empty list without a request.
    async fn search(&self, query: &str) -> ApiResult<Vec<TitleSummary>>;

    async fn trending(&self) -> ApiResult<Vec<TitleSummary>>;

    async fn movie(&self, id: u64) -> ApiResult<Title>;

    /// Watch offers for one region. A region without data is an empty record.
    async fn streaming(&self, id: u64, region: Region) -> ApiResult<StreamingAvailability>;

    async fn recommendations(&self, id: u64) -> ApiResult<Vec<TitleSummary>>;

    /// Best-effort country lookup, returns a raw country code
    async fn geolocate(&self) -> ApiResult<String>;
}
