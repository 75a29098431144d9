//! Per-sender concurrency control (§5: "a per-sender mutex ... serializes
//! the in-flight turn").
//!
//! Ensures only one turn runs per sender at a time. A second message
//! arriving while a turn is in-flight waits for the first to finish.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Each sender id maps to a `Semaphore(1)`. Acquiring the permit ensures
/// exclusive access for one turn at a time.
pub struct SenderLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for SenderLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SenderLockMap {
    pub fn new() -> Self {
        Self { locks: Mutex::new(HashMap::new()) }
    }

    /// Acquire the turn lock for `sender_id`, waiting if another turn for
    /// the same sender is already in flight. Hold the permit for the
    /// duration of the turn — it auto-releases on drop.
    pub async fn acquire(&self, sender_id: &str) -> Result<OwnedSemaphorePermit, SenderBusy> {
        let sem = {
            let mut locks = self.locks.lock();
            locks.entry(sender_id.to_owned()).or_insert_with(|| Arc::new(Semaphore::new(1))).clone()
        };
        sem.acquire_owned().await.map_err(|_| SenderBusy)
    }

    pub fn sender_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop locks for senders with no turn currently holding or waiting on
    /// them (periodic maintenance; safe at any time since a fresh lock is
    /// created lazily on next contact).
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| sem.available_permits() == 0);
    }
}

#[derive(Debug)]
pub struct SenderBusy;

impl std::fmt::Display for SenderBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sender lock closed")
    }
}

impl std::error::Error for SenderBusy {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_access() {
        let map = SenderLockMap::new();
        let p1 = map.acquire("s1").await.unwrap();
        drop(p1);
        let p2 = map.acquire("s1").await.unwrap();
        drop(p2);
    }

    #[tokio::test]
    async fn different_senders_concurrent() {
        let map = Arc::new(SenderLockMap::new());
        let p1 = map.acquire("s1").await.unwrap();
        let p2 = map.acquire("s2").await.unwrap();
        assert_eq!(map.sender_count(), 2);
        drop(p1);
        drop(p2);
    }

    #[tokio::test]
    async fn same_sender_waits() {
        let map = Arc::new(SenderLockMap::new());
        let map2 = map.clone();
        let p1 = map.acquire("s1").await.unwrap();

        let handle = tokio::spawn(async move {
            let _p2 = map2.acquire("s1").await.unwrap();
            42
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(p1);

        assert_eq!(handle.await.unwrap(), 42);
    }
}
