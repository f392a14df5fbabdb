// src/pipeline/cache.rs

//! Short-lived freshness cache in front of the snapshot store.
//!
//! Advisory only: a miss or TTL expiry never blocks anything, it just
//! sends the orchestrator down the fetch chain. One entry, overwritten on
//! every write.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::MenuSnapshot;

struct CacheEntry {
    snapshot: MenuSnapshot,
    written_at: Instant,
}

/// TTL-gated in-memory snapshot cache.
pub struct FreshnessCache {
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl FreshnessCache {
    /// Default time-to-live, matching the display's refresh window.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Return the cached snapshot if it is still within the TTL.
    pub fn read(&self) -> Option<MenuSnapshot> {
        let guard = self.entry.lock().expect("cache lock poisoned");
        guard
            .as_ref()
            .filter(|e| e.written_at.elapsed() < self.ttl)
            .map(|e| e.snapshot.clone())
    }

    /// Store a snapshot, overwriting any previous entry.
    pub fn write(&self, snapshot: MenuSnapshot) {
        let mut guard = self.entry.lock().expect("cache lock poisoned");
        *guard = Some(CacheEntry {
            snapshot,
            written_at: Instant::now(),
        });
    }
}

impl Default for FreshnessCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
