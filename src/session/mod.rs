//! Asynchronous query/session core
//!
//! - `request`: per-channel tokens and state
//! - `debounce`: search input settling
//! - `detail`: title + availability aggregation
//! - `region`: persisted region preference
//! - `geo`: one-shot default region detection
//! - `controller`: composes the above and owns the event pump

pub mod controller;
pub mod debounce;
pub mod detail;
pub mod geo;
pub mod region;
pub mod request;

pub use controller::{SessionController, SessionEvent};
pub use debounce::{QueryDebouncer, Submission};
pub use detail::{AvailabilityView, DetailAggregator, DetailView};
pub use geo::{GeoOutcome, GeoResolver};
pub use region::{FileRegionStorage, MemoryRegionStorage, RegionStorage, RegionStore};
pub use request::{Channel, ChannelState, RequestSession, RequestToken, Status};
