//! Menu synchronization pipeline.
//!
//! - `FreshnessCache`: TTL-gated cache in front of the store
//! - `SyncOrchestrator`: fallback chain, write-through, sentinel
//! - `SyncScheduler`: cancelable periodic refresh

pub mod cache;
pub mod scheduler;
pub mod sync;

pub use cache::FreshnessCache;
pub use scheduler::SyncScheduler;
pub use sync::{CurrentMenu, MenuResponse, SyncOrchestrator};
