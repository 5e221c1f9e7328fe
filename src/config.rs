//! Configuration management for CineGraph
//!
//! Handles config file loading and catalog selection.
//! Config is stored at ~/.config/cinegraph/config.toml

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::{BackendClient, CatalogApi, TmdbClient};
use crate::session::debounce::DEFAULT_WINDOW;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the CineGraph metadata service (e.g. http://localhost:8001)
    pub backend_url: Option<String>,
    /// TMDB API key, used when no service URL is configured
    pub tmdb_api_key: Option<String>,
    /// Search debounce window in milliseconds
    pub debounce_ms: Option<u64>,
}

impl Config {
    /// Get config file path (~/.config/cinegraph/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinegraph").join("config.toml"))
    }

    /// Load config from the default location, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load config from a specific file; a missing or unreadable file is the default
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| match toml::from_str(&s) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Apply environment overrides:
    /// 1. CINEGRAPH_BACKEND_URL
    /// 2. TMDB_API_KEY
    pub fn with_env(mut self) -> Self {
        if let Some(url) = non_empty_env("CINEGRAPH_BACKEND_URL") {
            self.backend_url = Some(url);
        }
        if let Some(key) = non_empty_env("TMDB_API_KEY") {
            self.tmdb_api_key = Some(key);
        }
        self
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_WINDOW)
    }

    /// Pick a catalog: the metadata service if configured, else TMDB directly
    pub fn catalog(&self) -> Result<Arc<dyn CatalogApi>> {
        if let Some(url) = self.backend_url.as_deref().filter(|u| !u.is_empty()) {
            tracing::debug!(url, "using metadata service");
            return Ok(Arc::new(BackendClient::new(url)));
        }
        if let Some(key) = self.tmdb_api_key.as_deref().filter(|k| !k.is_empty()) {
            tracing::debug!("using TMDB directly");
            return Ok(Arc::new(TmdbClient::new(key)));
        }
        bail!(
            "No catalog configured. Set CINEGRAPH_BACKEND_URL or TMDB_API_KEY, \
             or add backend_url / tmdb_api_key to {}",
            Self::path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config.toml".into())
        )
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
