//! Region preference
//!
//! `RegionStore` holds the one piece of durable client state: the country
//! used to scope streaming availability. Reads are served from memory;
//! `set` validates, updates memory, then persists.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::models::{Region, RegionError};

/// Durable backing for the region preference
pub trait RegionStorage: Send {
    /// Previously saved region, if any. Unreadable or unknown values count as absent.
    fn load(&self) -> Option<Region>;

    fn save(&self, region: Region) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    region: Option<String>,
}

/// Stores the region in `~/.config/cinegraph/state.toml`
#[derive(Debug, Clone)]
pub struct FileRegionStorage {
    path: PathBuf,
}

impl FileRegionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location next to the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinegraph").join("state.toml"))
    }
}

impl RegionStorage for FileRegionStorage {
    fn load(&self) -> Option<Region> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let state: StateFile = toml::from_str(&contents).ok()?;
        state.region.and_then(|code| Region::parse(&code).ok())
    }

    fn save(&self, region: Region) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let state = StateFile {
            region: Some(region.code().to_string()),
        };
        std::fs::write(&self.path, toml::to_string_pretty(&state)?)?;
        Ok(())
    }
}

/// In-process storage, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryRegionStorage {
    saved: Mutex<Option<Region>>,
}

impl MemoryRegionStorage {
    pub fn new(initial: Option<Region>) -> Self {
        Self {
            saved: Mutex::new(initial),
        }
    }
}

impl RegionStorage for MemoryRegionStorage {
    fn load(&self) -> Option<Region> {
        self.saved.lock().ok().and_then(|saved| *saved)
    }

    fn save(&self, region: Region) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| anyhow::anyhow!("region storage poisoned"))?;
        *saved = Some(region);
        Ok(())
    }
}

pub struct RegionStore {
    storage: Box<dyn RegionStorage>,
    current: Region,
    persisted: bool,
    revision: u64,
}

impl RegionStore {
    /// Load the saved region, falling back to `US`
    pub fn new(storage: Box<dyn RegionStorage>) -> Self {
        let saved = storage.load();
        Self {
            storage,
            current: saved.unwrap_or_default(),
            persisted: saved.is_some(),
            revision: 0,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryRegionStorage::default()))
    }

    pub fn get(&self) -> Region {
        self.current
    }

    /// Has a region ever been chosen (now or in an earlier session)?
    pub fn has_persisted(&self) -> bool {
        self.persisted
    }

    /// Bumped by every successful `set`
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Validate and switch region. The new value is readable immediately;
    /// a failure to persist is logged, not returned.
    pub fn set(&mut self, code: &str) -> Result<Region, RegionError> {
        let region = Region::parse(code)?;
        self.current = region;
        self.persisted = true;
        self.revision += 1;
        if let Err(e) = self.storage.save(region) {
            tracing::warn!(region = %region, error = %e, "failed to persist region");
        }
        Ok(region)
    }
}

impl std::fmt::Debug for RegionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionStore")
            .field("current", &self.current)
            .field("persisted", &self.persisted)
            .field("revision", &self.revision)
            .finish()
    }
}
