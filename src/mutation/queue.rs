use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as TurnLock, OwnedMutexGuard};

/// Per-key FIFO of mutations: a second mutation on a key waits for the first.
///
/// Keys name an entity field, e.g. `like:<cat id>`.
#[derive(Default)]
pub struct MutationQueue {
    locks: Mutex<HashMap<String, Arc<TurnLock<()>>>>,
}

/// Held while a mutation on its key is unresolved.
pub struct MutationTurn {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl MutationTurn {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for every earlier mutation on `key`, then take the turn.
    pub async fn acquire(&self, key: impl Into<String>) -> MutationTurn {
        let key = key.into();
        let lock = self.ensure_lock(&key);
        let guard = lock.lock_owned().await;
        MutationTurn { key, _guard: guard }
    }

    /// Whether a mutation on `key` is currently unresolved.
    pub fn is_pending(&self, key: &str) -> bool {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .get(key)
            .map_or(false, |lock| lock.try_lock().is_err())
    }

    fn ensure_lock(&self, key: &str) -> Arc<TurnLock<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Entries only the map references have no holder and no waiter.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(TurnLock::new(())))
            .clone()
    }
}
