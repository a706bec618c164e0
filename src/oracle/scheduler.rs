//! Refresh scheduler
//!
//! Runs one refresh at startup, then fires a refresh every interval until
//! shut down. Ticks never wait for the previous cycle: each one spawns a
//! refresh and the in-progress flag turns overlapping cycles into no-ops.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::oracle::refresher::{CacheRefresher, RefreshOutcome};

/// Handle to the background refresh loop
#[derive(Debug)]
pub struct RefreshScheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    interval: Duration,
}

impl RefreshScheduler {
    /// Await the initial refresh, then start the periodic loop
    pub async fn start(refresher: Arc<CacheRefresher>, interval: Duration) -> Self {
        let outcome = refresher.refresh().await;
        info!(?outcome, interval_ms = interval.as_millis() as u64, "Initial price refresh done");
        Self::spawn(refresher, interval)
    }

    /// Start the periodic loop without an initial refresh; the first tick
    /// fires one full interval from now
    pub fn spawn(refresher: Arc<CacheRefresher>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let refresher = Arc::clone(&refresher);
                        tokio::spawn(async move {
                            if refresher.refresh().await == RefreshOutcome::Skipped {
                                debug!("Scheduled refresh skipped, previous cycle still running");
                            }
                        });
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Refresh scheduler stopped");
        });

        Self {
            shutdown_tx,
            handle,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop scheduling new cycles and wait for the loop to exit.
    /// A cycle already in flight is left to finish on its own.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::sources::FixedPriceProvider;
    use crate::oracle::store::CacheState;

    fn refresher() -> (Arc<CacheState>, Arc<CacheRefresher>) {
        let state = Arc::new(CacheState::new());
        let refresher = Arc::new(CacheRefresher::new(state.clone(), FixedPriceProvider::new()));
        (state, refresher)
    }

    #[tokio::test]
    async fn start_refreshes_before_returning() {
        let (state, refresher) = refresher();
        let scheduler = RefreshScheduler::start(refresher, Duration::from_secs(30)).await;

        assert!(state.last_update().await.is_some());
        assert!(scheduler.is_running());
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_refresh_on_interval() {
        let (state, refresher) = refresher();
        let scheduler = RefreshScheduler::spawn(refresher, Duration::from_millis(30_000));
        assert!(state.last_update().await.is_none());

        tokio::time::sleep(Duration::from_millis(30_500)).await;
        // let the spawned refresh task run
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(state.last_update().await.is_some());

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_stops_loop() {
        let (_state, refresher) = refresher();
        let scheduler = RefreshScheduler::spawn(refresher, Duration::from_millis(10));
        assert_eq!(scheduler.interval(), Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(1), scheduler.shutdown())
            .await
            .expect("scheduler did not stop");
    }
}
