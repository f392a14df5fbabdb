// src/pipeline/sync.rs

//! Sync orchestrator.
//!
//! Drives the fallback chain across menu sources, applies the freshness
//! cache, writes through to the durable store, and exposes the current
//! menu to the display. `sync()` never fails outward: it returns either a
//! usable snapshot or the explicit no-data sentinel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{MenuOrigin, MenuSnapshot};
use crate::pipeline::FreshnessCache;
use crate::services::MenuSource;
use crate::storage::SnapshotStore;

/// Result of one sync cycle. "No data" is a defined terminal state, not
/// an error; the display renders its own placeholder for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentMenu {
    Menu(MenuSnapshot),
    NoData,
}

impl CurrentMenu {
    /// The snapshot, if any.
    pub fn snapshot(&self) -> Option<&MenuSnapshot> {
        match self {
            CurrentMenu::Menu(s) => Some(s),
            CurrentMenu::NoData => None,
        }
    }
}

/// Display pull shape: `{success, data, lastUpdated}`.
#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub success: bool,
    pub data: Option<MenuSnapshot>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<String>,
}

/// Orchestrates the source chain, cache, and store.
///
/// Sources are tried strictly in the order given at construction; later
/// sources are less authoritative and are only consulted after the ones
/// before them have failed. No two sources run concurrently.
pub struct SyncOrchestrator {
    sources: Vec<Box<dyn MenuSource>>,
    store: Arc<dyn SnapshotStore>,
    cache: FreshnessCache,
    /// Serializes fetch chains so overlapping sync calls collapse to one
    /// set of upstream requests per TTL window.
    fetch_lock: tokio::sync::Mutex<()>,
    /// Highest fetched_at written to the store so far.
    last_fetched: std::sync::Mutex<Option<DateTime<Utc>>>,
}

impl SyncOrchestrator {
    pub fn new(
        sources: Vec<Box<dyn MenuSource>>,
        store: Arc<dyn SnapshotStore>,
        ttl: std::time::Duration,
    ) -> Self {
        Self {
            sources,
            store,
            cache: FreshnessCache::new(ttl),
            fetch_lock: tokio::sync::Mutex::new(()),
            last_fetched: std::sync::Mutex::new(None),
        }
    }

    /// Run one sync cycle.
    ///
    /// Cache hit short-circuits the whole chain. Otherwise the first
    /// successful source wins and is written through to the store and
    /// cache. On exhaustion the last durably stored snapshot is served
    /// unchanged; an empty store yields the no-data sentinel.
    pub async fn sync(&self) -> CurrentMenu {
        if let Some(cached) = self.cache.read() {
            log::debug!("Serving menu from freshness cache");
            return CurrentMenu::Menu(cached.with_origin(MenuOrigin::Cache));
        }

        let _guard = self.fetch_lock.lock().await;

        // A concurrent cycle may have finished while we waited for the
        // lock; its result is in the cache and upstreams are not called
        // again.
        if let Some(cached) = self.cache.read() {
            log::debug!("Joined in-flight sync result from cache");
            return CurrentMenu::Menu(cached.with_origin(MenuOrigin::Cache));
        }

        for source in &self.sources {
            match source.fetch().await {
                Ok(snapshot) => {
                    let snapshot = self.enforce_monotonic(snapshot);
                    log::info!(
                        "Sync succeeded via {} source (origin: {})",
                        source.name(),
                        snapshot.origin
                    );

                    // A failed write is fatal for persistence but not for
                    // the cycle: the fresh snapshot is still served.
                    if let Err(e) = self.store.put(&snapshot).await {
                        log::error!("Failed to persist snapshot: {e}");
                    }
                    self.cache.write(snapshot.clone());
                    return CurrentMenu::Menu(snapshot);
                }
                Err(e) => {
                    log::warn!("Source {} failed: {e}", source.name());
                }
            }
        }

        log::warn!("All menu sources exhausted; falling back to stored snapshot");
        match self.store.get().await {
            Ok(Some(stale)) => CurrentMenu::Menu(stale),
            Ok(None) => CurrentMenu::NoData,
            Err(e) => {
                log::error!("Store read failed during exhaustion fallback: {e}");
                CurrentMenu::NoData
            }
        }
    }

    /// Display pull endpoint payload, read from the durable store.
    pub async fn response(&self) -> MenuResponse {
        let data = self.store.get().await.unwrap_or_else(|e| {
            log::error!("Store read failed: {e}");
            None
        });
        let last_updated = self
            .store
            .last_updated()
            .await
            .ok()
            .flatten()
            .map(|at| at.to_rfc3339());

        MenuResponse {
            success: true,
            data,
            last_updated,
        }
    }

    /// Keep fetched_at non-decreasing across snapshots from this
    /// orchestrator instance.
    fn enforce_monotonic(&self, snapshot: MenuSnapshot) -> MenuSnapshot {
        let mut last = self.last_fetched.lock().expect("fetch stamp lock poisoned");
        let snapshot = match *last {
            Some(prev) if snapshot.fetched_at < prev => MenuSnapshot {
                fetched_at: prev,
                ..snapshot
            },
            _ => snapshot,
        };
        *last = Some(snapshot.fetched_at);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::MenuPayload;
    use crate::storage::LocalStore;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample_snapshot(origin: MenuOrigin) -> MenuSnapshot {
        let payload: MenuPayload = serde_json::from_str(
            r#"{
                "menuA": {"name": "豚肉の生姜焼き弁当", "price": "550"},
                "menuB": {"name": "鶏の唐揚げ弁当", "price": "600"},
                "menuC": {"name": "鯖の塩焼き弁当", "price": "650"}
            }"#,
        )
        .unwrap();
        let now = Utc::now();
        payload.to_snapshot(now, now, origin, None)
    }

    /// Source that succeeds or fails on demand, counting its calls.
    struct StubSource {
        name: &'static str,
        origin: MenuOrigin,
        succeed: bool,
        delay_ms: u64,
        calls: Arc<AtomicUsize>,
    }

    impl StubSource {
        fn boxed(
            name: &'static str,
            origin: MenuOrigin,
            succeed: bool,
            calls: Arc<AtomicUsize>,
        ) -> Box<dyn MenuSource> {
            Box::new(Self {
                name,
                origin,
                succeed,
                delay_ms: 0,
                calls,
            })
        }
    }

    #[async_trait]
    impl MenuSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        fn origin(&self) -> MenuOrigin {
            self.origin
        }

        async fn fetch(&self) -> Result<MenuSnapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.succeed {
                Ok(sample_snapshot(self.origin))
            } else {
                Err(FetchError::NoPosts {
                    username: "okazunoharmony".into(),
                })
            }
        }
    }

    fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        )
    }

    fn orchestrator(
        sources: Vec<Box<dyn MenuSource>>,
        store: Arc<dyn SnapshotStore>,
        ttl: Duration,
    ) -> SyncOrchestrator {
        SyncOrchestrator::new(sources, store, ttl)
    }

    #[tokio::test]
    async fn fallback_reaches_local_file() {
        let tmp = TempDir::new().unwrap();
        let (c1, c2, c3) = counters();
        let orch = orchestrator(
            vec![
                StubSource::boxed("sheet", MenuOrigin::RemoteStructured, false, c1.clone()),
                StubSource::boxed("feed", MenuOrigin::AnnouncementExtracted, false, c2.clone()),
                StubSource::boxed("file", MenuOrigin::LocalFile, true, c3.clone()),
            ],
            Arc::new(LocalStore::new(tmp.path())),
            Duration::from_secs(60),
        );

        let result = orch.sync().await;
        assert_eq!(
            result.snapshot().map(|s| s.origin),
            Some(MenuOrigin::LocalFile)
        );
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 1);
        assert_eq!(c3.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let tmp = TempDir::new().unwrap();
        let (c1, c2, c3) = counters();
        let orch = orchestrator(
            vec![
                StubSource::boxed("sheet", MenuOrigin::RemoteStructured, true, c1.clone()),
                StubSource::boxed("feed", MenuOrigin::AnnouncementExtracted, true, c2.clone()),
                StubSource::boxed("file", MenuOrigin::LocalFile, true, c3.clone()),
            ],
            Arc::new(LocalStore::new(tmp.path())),
            Duration::from_secs(60),
        );

        let result = orch.sync().await;
        assert_eq!(
            result.snapshot().map(|s| s.origin),
            Some(MenuOrigin::RemoteStructured)
        );
        assert_eq!(c2.load(Ordering::SeqCst), 0);
        assert_eq!(c3.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhaustion_serves_stored_snapshot_unchanged() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(LocalStore::new(tmp.path()));

        let prior = sample_snapshot(MenuOrigin::RemoteStructured);
        store.put(&prior).await.unwrap();

        let (c1, c2, c3) = counters();
        let orch = orchestrator(
            vec![
                StubSource::boxed("sheet", MenuOrigin::RemoteStructured, false, c1),
                StubSource::boxed("feed", MenuOrigin::AnnouncementExtracted, false, c2),
                StubSource::boxed("file", MenuOrigin::LocalFile, false, c3),
            ],
            store,
            Duration::from_secs(60),
        );

        let result = orch.sync().await;
        // The prior snapshot comes back as-is, not re-timestamped.
        assert_eq!(result, CurrentMenu::Menu(prior));
    }

    #[tokio::test]
    async fn empty_everything_is_no_data() {
        let tmp = TempDir::new().unwrap();
        let (c1, c2, c3) = counters();
        let orch = orchestrator(
            vec![
                StubSource::boxed("sheet", MenuOrigin::RemoteStructured, false, c1),
                StubSource::boxed("feed", MenuOrigin::AnnouncementExtracted, false, c2),
                StubSource::boxed("file", MenuOrigin::LocalFile, false, c3),
            ],
            Arc::new(LocalStore::new(tmp.path())),
            Duration::from_secs(60),
        );

        assert_eq!(orch.sync().await, CurrentMenu::NoData);
    }

    #[tokio::test]
    async fn cache_hit_skips_every_source() {
        let tmp = TempDir::new().unwrap();
        let (c1, c2, c3) = counters();
        let orch = orchestrator(
            vec![
                StubSource::boxed("sheet", MenuOrigin::RemoteStructured, true, c1.clone()),
                StubSource::boxed("feed", MenuOrigin::AnnouncementExtracted, true, c2),
                StubSource::boxed("file", MenuOrigin::LocalFile, true, c3),
            ],
            Arc::new(LocalStore::new(tmp.path())),
            Duration::from_secs(60),
        );

        orch.sync().await;
        let second = orch.sync().await;

        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(
            second.snapshot().map(|s| s.origin),
            Some(MenuOrigin::Cache)
        );
    }

    #[tokio::test]
    async fn overlapping_syncs_collapse_to_one_fetch() {
        let tmp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let slow = Box::new(StubSource {
            name: "sheet",
            origin: MenuOrigin::RemoteStructured,
            succeed: true,
            delay_ms: 50,
            calls: calls.clone(),
        });
        let orch = Arc::new(orchestrator(
            vec![slow],
            Arc::new(LocalStore::new(tmp.path())),
            Duration::from_secs(60),
        ));

        let (a, b) = tokio::join!(orch.sync(), orch.sync());
        assert!(a.snapshot().is_some());
        assert!(b.snapshot().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_cache_triggers_refetch() {
        let tmp = TempDir::new().unwrap();
        let (c1, c2, c3) = counters();
        let orch = orchestrator(
            vec![
                StubSource::boxed("sheet", MenuOrigin::RemoteStructured, true, c1.clone()),
                StubSource::boxed("feed", MenuOrigin::AnnouncementExtracted, true, c2),
                StubSource::boxed("file", MenuOrigin::LocalFile, true, c3),
            ],
            Arc::new(LocalStore::new(tmp.path())),
            Duration::from_millis(20),
        );

        orch.sync().await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        orch.sync().await;

        assert_eq!(c1.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn response_reports_stored_state() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(LocalStore::new(tmp.path()));
        let orch = orchestrator(vec![], store.clone(), Duration::from_secs(60));

        let empty = orch.response().await;
        assert!(empty.success);
        assert!(empty.data.is_none());
        assert!(empty.last_updated.is_none());

        let snapshot = sample_snapshot(MenuOrigin::RemoteStructured);
        store.put(&snapshot).await.unwrap();

        let filled = orch.response().await;
        assert!(filled.data.is_some());
        assert_eq!(
            filled.last_updated,
            Some(snapshot.fetched_at.to_rfc3339())
        );
    }

    #[tokio::test]
    async fn fetched_at_never_goes_backwards() {
        let tmp = TempDir::new().unwrap();
        let orch = orchestrator(
            vec![],
            Arc::new(LocalStore::new(tmp.path())),
            Duration::from_secs(60),
        );

        let later = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();

        let first = MenuSnapshot {
            fetched_at: later,
            ..sample_snapshot(MenuOrigin::RemoteStructured)
        };
        let second = MenuSnapshot {
            fetched_at: earlier,
            ..sample_snapshot(MenuOrigin::LocalFile)
        };

        assert_eq!(orch.enforce_monotonic(first).fetched_at, later);
        // A clock that went backwards gets clamped to the last stamp.
        assert_eq!(orch.enforce_monotonic(second).fetched_at, later);
    }
}
