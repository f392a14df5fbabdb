// src/pipeline/scheduler.rs

//! Background refresh scheduler.
//!
//! Invokes `sync()` on a fixed interval, independent of display pulls.
//! The first tick fires immediately so a fresh process has data before
//! the first interval elapses. Shutdown stops future cycles without
//! waiting on an in-flight one; the in-flight cycle finishes or times
//! out on its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::pipeline::{CurrentMenu, SyncOrchestrator};

/// Cancelable interval driver for the orchestrator.
pub struct SyncScheduler {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl SyncScheduler {
    /// Spawn the refresh loop.
    pub fn spawn(orchestrator: Arc<SyncOrchestrator>, interval: Duration) -> Self {
        let (shutdown, mut stop) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match orchestrator.sync().await {
                            CurrentMenu::Menu(snapshot) => {
                                log::info!(
                                    "Scheduled sync: menu from {} (fetched {})",
                                    snapshot.origin,
                                    snapshot.fetched_at.to_rfc3339()
                                );
                            }
                            CurrentMenu::NoData => {
                                log::warn!("Scheduled sync: no menu data available");
                            }
                        }
                    }
                    _ = stop.changed() => {
                        log::info!("Sync scheduler stopping");
                        break;
                    }
                }
            }
        });

        Self { handle, shutdown }
    }

    /// Stop future cycles and wait for the loop task to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
