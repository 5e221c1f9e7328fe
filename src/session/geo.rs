//! One-shot default-region detection
//!
//! Runs at most once per session and only when no region was ever chosen.
//! The lookup remembers the store revision it started at; if the user picked
//! a region in the meantime the lookup result is dropped.

use crate::api::ApiError;
use crate::models::Region;

use super::region::RegionStore;

/// An outstanding lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoLookup {
    started_at_revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoOutcome {
    /// Detected region written through the store
    Applied(Region),
    /// User chose a region while the lookup was pending
    Superseded,
    /// Lookup answered with a code outside the supported set
    Unsupported(String),
    /// Lookup failed; default left in place
    Failed(String),
}

#[derive(Debug, Default)]
pub struct GeoResolver {
    started: bool,
}

impl GeoResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the lookup if this session has not tried yet and nothing is
    /// stored.
    pub fn start(&mut self, store: &RegionStore) -> Option<GeoLookup> {
        if self.started || store.has_persisted() {
            return None;
        }
        self.started = true;
        Some(GeoLookup {
            started_at_revision: store.revision(),
        })
    }

    /// Apply the lookup result unless the user has set a region since it
    /// started.
    pub fn resolve(
        &self,
        lookup: GeoLookup,
        result: Result<String, ApiError>,
        store: &mut RegionStore,
    ) -> GeoOutcome {
        let outcome = if store.revision() != lookup.started_at_revision {
            GeoOutcome::Superseded
        } else {
            match result {
                Ok(code) => match store.set(&code) {
                    Ok(region) => GeoOutcome::Applied(region),
                    Err(_) => GeoOutcome::Unsupported(code),
                },
                Err(e) => GeoOutcome::Failed(e.to_string()),
            }
        };
        match &outcome {
            GeoOutcome::Applied(region) => tracing::info!(%region, "detected region"),
            GeoOutcome::Superseded => tracing::info!("region chosen manually, ignoring lookup"),
            GeoOutcome::Unsupported(code) => {
                tracing::warn!(code = %code, "geolocation returned unsupported region")
            }
            GeoOutcome::Failed(error) => tracing::warn!(error = %error, "geolocation failed"),
        }
        outcome
    }
}
