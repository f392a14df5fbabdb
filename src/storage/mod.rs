//! Durable snapshot persistence.
//!
//! A single logical slot holds the latest `MenuSnapshot` plus its fetch
//! timestamp, shared by the scheduled producer and any display consumers.
//! Writes are last-write-wins; there is no versioning because snapshots
//! are produced by a single periodic driver.
//!
//! Two keys: `latestMenu` (JSON-serialized snapshot) and `lastUpdated`
//! (ISO timestamp of the last successful write).

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::MenuSnapshot;

// Re-export for convenience
pub use local::LocalStore;

/// Key for the JSON-serialized latest snapshot.
pub const KEY_LATEST_MENU: &str = "latestMenu";

/// Key for the ISO timestamp of the last successful write.
pub const KEY_LAST_UPDATED: &str = "lastUpdated";

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored snapshot unconditionally and record the write
    /// timestamp.
    async fn put(&self, snapshot: &MenuSnapshot) -> Result<(), StoreError>;

    /// Load the latest snapshot. An empty store is `Ok(None)`, never an
    /// error.
    async fn get(&self) -> Result<Option<MenuSnapshot>, StoreError>;

    /// Timestamp of the last successful `put`, if any.
    async fn last_updated(&self) -> Result<Option<DateTime<Utc>>, StoreError>;
}
