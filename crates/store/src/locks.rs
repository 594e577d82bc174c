//! Per-payment mutual exclusion for read-modify-write sequences.

use std::collections::HashMap;
use std::sync::Arc;

use common::PaymentId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-payment async locks.
///
/// The store serializes individual operations, but a re-fetch-then-update
/// sequence (the simulator's pipeline, a manual patch) spans two operations
/// and would lose updates if two of them raced on the same id. Holding the
/// payment's lock across the sequence restores the serial execution the
/// single-threaded reference scheduler provided implicitly.
///
/// Entries are never pruned: payments are never deleted, so the registry is
/// bounded by the size of the store.
#[derive(Debug, Default)]
pub struct PaymentLocks {
    inner: Mutex<HashMap<PaymentId, Arc<Mutex<()>>>>,
}

impl PaymentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `id`, creating it on first use.
    ///
    /// The guard is owned, so it can be held across await points.
    pub async fn acquire(&self, id: PaymentId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.inner.lock().await;
            registry
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
