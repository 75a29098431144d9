//! Per-tenant exclusive lock (§5): one `Semaphore(1)` per club, covering
//! both the catalog and the round ledger in-memory mirrors. Unlike a
//! per-sender lock there is no "busy" rejection here — commands queue and
//! run in acquisition order, which is the ordering guarantee §5 promises.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Default)]
pub struct TenantLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl TenantLockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for `club_id`, waiting if another command
    /// for the same tenant is in flight. The permit releases the lock when
    /// dropped; callers must persist before dropping it and send outbound
    /// messages only after it drops (§5).
    pub async fn acquire(&self, club_id: &str) -> OwnedSemaphorePermit {
        let sem = {
            let mut locks = self.locks.lock();
            locks.entry(club_id.to_owned()).or_insert_with(|| Arc::new(Semaphore::new(1))).clone()
        };
        sem.acquire_owned().await.expect("tenant semaphore is never closed")
    }
}
