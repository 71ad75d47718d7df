use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::api::{CatDraft, RemoteApi};
use crate::error::SyncError;
use crate::model::Cat;
use crate::paged::PagedStore;
use crate::search::normalize_tags;
use crate::sources::FeedSource;

/// Posts new cats and splices them into the feed.
pub struct Composer {
    api: Arc<dyn RemoteApi>,
    feed: Arc<PagedStore<FeedSource>>,
    posting: AtomicBool,
    posting_error: Mutex<Option<SyncError>>,
}

struct PostingFlag<'a>(&'a AtomicBool);

impl Drop for PostingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Composer {
    pub fn new(api: Arc<dyn RemoteApi>, feed: Arc<PagedStore<FeedSource>>) -> Self {
        Self {
            api,
            feed,
            posting: AtomicBool::new(false),
            posting_error: Mutex::new(None),
        }
    }

    pub fn is_posting(&self) -> bool {
        self.posting.load(Ordering::SeqCst)
    }

    pub fn posting_error(&self) -> Option<String> {
        self.error_slot().as_ref().and_then(SyncError::display_message)
    }

    /// Create a cat from `draft`. Tags are normalized first. On success the
    /// new cat is put at the front of the feed.
    pub async fn post_cat(&self, mut draft: CatDraft) -> Result<Cat, SyncError> {
        if draft.name.trim().is_empty() {
            return Err(SyncError::Rejected("A cat needs a name.".into()));
        }
        if draft.media.is_empty() {
            return Err(SyncError::Rejected("A cat needs a photo.".into()));
        }
        if self.posting.swap(true, Ordering::SeqCst) {
            return Err(SyncError::Rejected("Already posting.".into()));
        }
        let _flag = PostingFlag(&self.posting);
        *self.error_slot() = None;

        draft.name = draft.name.trim().to_string();
        draft.tags = normalize_tags(&draft.tags.join(" "));
        debug!(name = %draft.name, tags = ?draft.tags, "posting cat");

        match self.api.create_cat(&draft).await {
            Ok(cat) => {
                self.feed.prepend(cat.clone());
                Ok(cat)
            }
            Err(err) => {
                warn!(error = %err, "cat post failed");
                *self.error_slot() = Some(err.clone());
                Err(err)
            }
        }
    }

    fn error_slot(&self) -> MutexGuard<'_, Option<SyncError>> {
        self.posting_error.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
