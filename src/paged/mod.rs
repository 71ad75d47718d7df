//! Paginated resource stores.
//!
//! A [`PagedStore`] owns one ordered list fetched page by page from a
//! [`PageSource`]. `refresh` replaces the list with the first page,
//! `load_more_if_needed` appends the next page when the view reaches the
//! trailing window. All loads go through the store's single-flight slot.
//!
//! ```ignore
//! let feed = PagedStore::new(FeedSource::new(api), Some(FeedScope::everyone()), config.list_paging());
//! feed.refresh().await;
//! let mut rx = feed.subscribe();
//! feed.load_more_if_needed(&visible_cat.id).await;
//! ```

mod state;
mod store;

use std::fmt;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::model::{Cursor, Identified, Page};

pub use state::ListState;
pub use store::PagedStore;

/// Where a store's pages come from.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Identified;
    /// What the list is about, e.g. a feed scope or a collection id.
    type Target: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Short name used in logs and change events.
    fn label(&self) -> &'static str;

    async fn fetch(
        &self,
        target: &Self::Target,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<Self::Item>, SyncError>;
}

/// Result of a load request, for callers that care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was committed; `added` counts new (de-duplicated) items.
    Committed { added: usize },
    /// An identical load was already in flight; the caller waited for it.
    Coalesced,
    /// Nothing to do: no target, no more pages, trigger not armed, or busy.
    Skipped,
    /// The load failed; the error is also in `last_error`.
    Failed(SyncError),
    /// The result arrived after the store moved on and was dropped.
    Discarded,
}

impl LoadOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, LoadOutcome::Committed { .. })
    }
}

/// Key of the store's single-flight slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Intent<T> {
    Refresh(T),
    LoadMore(T),
}
