//! Per-key mutual exclusion for cells and clusters.
//!
//! Lock order is always cell, then cluster. Decisions take only the cluster
//! lock, so the two paths cannot deadlock.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use tideguard_core::models::{ClusterId, GridCell};

#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, cell: &GridCell) -> Arc<Mutex<()>> {
        self.handle(format!("cell:{cell}"))
    }

    pub fn cluster(&self, id: &ClusterId) -> Arc<Mutex<()>> {
        self.handle(format!("cluster:{id}"))
    }

    fn handle(&self, key: String) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(key).or_default().value())
    }

    /// Drop entries nobody currently holds a handle to.
    pub fn prune_idle(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Acquire a lock handle. The guarded value is `()`, so a poisoned lock
/// carries no broken state and is simply taken over.
pub fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
