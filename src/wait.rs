//! The debounce timer primitive.

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait WaitMs: Send + Sync {
    /// Suspend for `ms` milliseconds.
    async fn wait_ms(&self, ms: u64);
}

/// [`WaitMs`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioWait;

#[async_trait]
impl WaitMs for TokioWait {
    async fn wait_ms(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
