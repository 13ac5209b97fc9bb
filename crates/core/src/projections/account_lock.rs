//! Per-account mutual exclusion for projection regeneration.
//!
//! Regeneration is a delete-then-recreate sequence. Two overlapping calls
//! for the same account must run one after the other; calls for different
//! accounts never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of async mutexes keyed by account id.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of a regeneration; released on drop, including
/// early returns and unwinding.
#[must_use = "the account is unlocked as soon as the guard is dropped"]
pub struct AccountLockGuard<'a> {
    registry: &'a AccountLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds the lock for `key`.
    pub async fn lock(&self, key: &str) -> AccountLockGuard<'_> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        let guard = mutex.lock_owned().await;
        AccountLockGuard {
            registry: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    pub fn is_locked(&self, key: &str) -> bool {
        let locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .get(key)
            .is_some_and(|mutex| mutex.try_lock().is_err())
    }

    /// Number of keys currently tracked; idle keys are pruned on release.
    pub fn tracked_keys(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn release(&self, key: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // Only the registry itself still references the mutex: nobody is waiting
        if locks
            .get(key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            locks.remove(key);
        }
    }
}

impl Drop for AccountLockGuard<'_> {
    fn drop(&mut self) {
        // Unlock before pruning so the strong count reflects only waiters
        self.guard.take();
        self.registry.release(&self.key);
    }
}
