//! Single-flight guard for a store's one in-flight operation slot.
//!
//! `run_exclusive` either leads a new operation or waits for the current
//! one. A waiter whose key matches the running operation is coalesced onto
//! it; a waiter with a different key starts its own operation once the
//! slot frees. `try_run` never waits.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

/// How a caller's intent was served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flight<T> {
    /// This caller ran the operation.
    Led(T),
    /// An identical operation was already running; this caller awaited it.
    Joined,
}

struct Occupant<K> {
    key: K,
    ticket: u64,
    done: watch::Receiver<bool>,
}

enum Claim<'a, K> {
    Acquired(Release<'a, K>),
    Busy {
        same_key: bool,
        done: watch::Receiver<bool>,
    },
}

pub struct SingleFlight<K> {
    slot: Mutex<Option<Occupant<K>>>,
    tickets: AtomicU64,
}

impl<K> Default for SingleFlight<K> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
            tickets: AtomicU64::new(0),
        }
    }
}

impl<K: Clone + PartialEq> SingleFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.slot().is_some()
    }

    /// Key of the operation currently holding the slot.
    pub fn current_key(&self) -> Option<K> {
        self.slot().as_ref().map(|occupant| occupant.key.clone())
    }

    pub async fn run_exclusive<F, Fut, T>(&self, key: K, op: F) -> Flight<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            match self.claim(&key) {
                Claim::Acquired(release) => {
                    let output = op().await;
                    drop(release);
                    return Flight::Led(output);
                }
                Claim::Busy { same_key, done } => {
                    wait_done(done).await;
                    if same_key {
                        return Flight::Joined;
                    }
                }
            }
        }
    }

    /// Run `op` only if the slot is free right now.
    pub async fn try_run<F, Fut, T>(&self, key: K, op: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.claim(&key) {
            Claim::Acquired(release) => {
                let output = op().await;
                drop(release);
                Some(output)
            }
            Claim::Busy { .. } => None,
        }
    }

    fn claim(&self, key: &K) -> Claim<'_, K> {
        let mut slot = self.slot();
        if let Some(occupant) = slot.as_ref() {
            return Claim::Busy {
                same_key: occupant.key == *key,
                done: occupant.done.clone(),
            };
        }

        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(false);
        *slot = Some(Occupant {
            key: key.clone(),
            ticket,
            done: rx,
        });
        Claim::Acquired(Release {
            flight: self,
            ticket,
            done: tx,
        })
    }

    fn slot(&self) -> MutexGuard<'_, Option<Occupant<K>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn wait_done(mut done: watch::Receiver<bool>) {
    // A closed channel means the leader is gone, which also frees the slot.
    let _ = done.wait_for(|finished| *finished).await;
}

/// Frees the slot when the leading operation finishes or is dropped mid-flight.
struct Release<'a, K> {
    flight: &'a SingleFlight<K>,
    ticket: u64,
    done: watch::Sender<bool>,
}

impl<K> Drop for Release<'_, K> {
    fn drop(&mut self) {
        let mut slot = self
            .flight
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().map(|occupant| occupant.ticket) == Some(self.ticket) {
            *slot = None;
        }
        drop(slot);
        self.done.send_replace(true);
    }
}
