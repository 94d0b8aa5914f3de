//! Per-key writer locks
//!
//! Uploads for one supplier (or imports for one pharmacy) run one at a time;
//! writers for different keys never wait on each other. The entry for a key
//! lives until the record behind it is deleted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Held by the single writer of one key until its snapshot is published
#[derive(Debug)]
pub struct WriterGuard {
    key: Uuid,
    _guard: OwnedMutexGuard<()>,
}

impl WriterGuard {
    pub fn key(&self) -> Uuid {
        self.key
    }
}

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    /// Wait for exclusive write access to `key`
    pub async fn acquire(&self, key: Uuid) -> WriterGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key).or_default().clone()
        };

        WriterGuard {
            key,
            _guard: lock.lock_owned().await,
        }
    }

    /// Release `guard` and drop its key's entry. Writers already queued on
    /// the old entry still get it in turn, so they must re-check that the
    /// record exists before writing.
    pub fn forget(&self, guard: WriterGuard) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.remove(&guard.key);
        drop(guard);
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
