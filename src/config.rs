//! Tunables for the stores. None of these values is a correctness contract.

use std::time::Duration;

use serde::Deserialize;

use crate::error::SyncError;

const DETAIL_PAGE_MIN: usize = 4;
const DETAIL_PAGE_MAX: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Page size for the feed, search results, follow edges and collection lists.
    pub page_size: usize,
    /// Page size for collection detail previews.
    pub detail_page_size: usize,
    pub comment_page_size: usize,
    /// How many trailing items arm the load-more trigger.
    pub prefetch_window: usize,
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            detail_page_size: 30,
            comment_page_size: 20,
            prefetch_window: 5,
            debounce_ms: 300,
        }
    }
}

impl SyncConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SyncError> {
        let config: SyncConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Clamp values into their usable ranges.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.comment_page_size = self.comment_page_size.max(1);
        self.detail_page_size = self.detail_page_size.clamp(DETAIL_PAGE_MIN, DETAIL_PAGE_MAX);
        self.prefetch_window = self.prefetch_window.max(1);
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn list_paging(&self) -> Paging {
        Paging::new(self.page_size, self.prefetch_window)
    }

    pub fn detail_paging(&self) -> Paging {
        Paging::new(self.detail_page_size, self.prefetch_window)
    }

    pub fn comment_paging(&self) -> Paging {
        Paging::new(self.comment_page_size, self.prefetch_window)
    }
}

/// Per-store slice of [`SyncConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page_size: usize,
    pub prefetch_window: usize,
}

impl Paging {
    pub fn new(page_size: usize, prefetch_window: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            prefetch_window: prefetch_window.max(1),
        }
    }
}

impl Default for Paging {
    fn default() -> Self {
        SyncConfig::default().list_paging()
    }
}
