//! Snapshot store - process-wide cache state
//!
//! The snapshot and its `last_update` stamp are published together behind a
//! single lock that is only held for an `Arc` clone or swap, so readers never
//! wait on a refresh cycle and never see a half-built map.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::Snapshot;

/// Snapshot plus the time it was published
#[derive(Debug, Clone, Default)]
pub struct CacheView {
    pub snapshot: Arc<Snapshot>,
    /// Epoch ms of the last completed refresh; `None` before the first one
    pub last_update: Option<i64>,
}

/// Shared cache state. Written only by the refresher.
#[derive(Debug, Default)]
pub struct CacheState {
    view: RwLock<CacheView>,
    is_updating: AtomicBool,
}

impl CacheState {
    /// Empty snapshot, never updated, not updating
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot and its publication time
    pub async fn view(&self) -> CacheView {
        self.view.read().await.clone()
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.view.read().await.snapshot.clone()
    }

    pub async fn last_update(&self) -> Option<i64> {
        self.view.read().await.last_update
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating.load(Ordering::Acquire)
    }

    /// Claim the in-progress flag; `None` if a refresh already holds it
    pub(crate) fn try_begin_update(&self) -> Option<UpdateGuard<'_>> {
        self.is_updating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| UpdateGuard { state: self })
    }

    /// Replace the snapshot wholesale
    pub(crate) async fn publish(&self, snapshot: Snapshot, completed_at: i64) {
        let next = CacheView {
            snapshot: Arc::new(snapshot),
            last_update: Some(completed_at),
        };
        *self.view.write().await = next;
    }
}

/// Clears `is_updating` when dropped, on every exit path
#[derive(Debug)]
pub(crate) struct UpdateGuard<'a> {
    state: &'a CacheState,
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.state.is_updating.store(false, Ordering::Release);
    }
}
