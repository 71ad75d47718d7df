#![allow(dead_code)]

pub mod fixtures;
pub mod mock_api;

use std::sync::Arc;

use async_trait::async_trait;
use feedsync::{SyncConfig, SyncRoot, TokioWait, WaitMs};

pub use fixtures::*;
pub use mock_api::{open, Call, Endpoint, MockApi};

/// A root wired to `api` with the tokio timer and default tunables.
pub fn root(api: &Arc<MockApi>) -> SyncRoot {
    SyncRoot::new(api.clone(), Arc::new(TokioWait), SyncConfig::default())
}

/// A timer that never fires, for tests that must not reach the network.
pub struct NeverWait;

#[async_trait]
impl WaitMs for NeverWait {
    async fn wait_ms(&self, _ms: u64) {
        std::future::pending::<()>().await;
    }
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
