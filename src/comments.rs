//! Comment sheets: one lazily created paged store per cat.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::api::RemoteApi;
use crate::config::Paging;
use crate::error::SyncError;
use crate::model::{Comment, UserSummary};
use crate::observe::{ChangeEvent, ChangeFeed};
use crate::paged::{ListState, LoadOutcome, PagedStore};
use crate::sources::CommentSource;

/// The comment list of one cat plus its posting status.
pub struct CommentThread {
    cat_id: String,
    store: PagedStore<CommentSource>,
    posting: AtomicUsize,
    post_error: Mutex<Option<SyncError>>,
}

impl CommentThread {
    pub fn cat_id(&self) -> &str {
        &self.cat_id
    }

    pub fn store(&self) -> &PagedStore<CommentSource> {
        &self.store
    }

    pub fn state(&self) -> ListState<Comment> {
        self.store.state()
    }

    pub async fn refresh(&self) -> LoadOutcome {
        self.store.refresh().await
    }

    /// Load older comments once `oldest_visible_id` enters the trailing window.
    pub async fn load_more_if_needed(&self, oldest_visible_id: &str) -> LoadOutcome {
        self.store.load_more_if_needed(oldest_visible_id).await
    }

    pub fn is_posting(&self) -> bool {
        self.posting.load(Ordering::SeqCst) > 0
    }

    /// Message of the last failed post, cleared by the next post attempt.
    pub fn post_error(&self) -> Option<String> {
        self.post_error_slot()
            .as_ref()
            .and_then(SyncError::display_message)
    }

    fn post_error_slot(&self) -> MutexGuard<'_, Option<SyncError>> {
        self.post_error.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decrements the posting counter on every exit path.
struct Posting<'a>(&'a AtomicUsize);

impl<'a> Posting<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Posting(counter)
    }
}

impl Drop for Posting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct CommentThreads {
    api: Arc<dyn RemoteApi>,
    paging: Paging,
    changes: ChangeFeed,
    threads: Mutex<HashMap<String, Arc<CommentThread>>>,
    local_ids: AtomicU64,
}

impl CommentThreads {
    pub fn new(api: Arc<dyn RemoteApi>, paging: Paging, changes: ChangeFeed) -> Self {
        Self {
            api,
            paging,
            changes,
            threads: Mutex::new(HashMap::new()),
            local_ids: AtomicU64::new(0),
        }
    }

    /// The thread for `cat_id`, created on first use. Nothing is fetched.
    pub fn thread(&self, cat_id: &str) -> Arc<CommentThread> {
        let mut threads = self.threads();
        threads
            .entry(cat_id.to_string())
            .or_insert_with(|| {
                debug!(cat_id, "comment thread opened");
                let store = PagedStore::new(
                    CommentSource::new(self.api.clone()),
                    Some(cat_id.to_string()),
                    self.paging,
                )
                .with_changes(self.changes.clone());
                Arc::new(CommentThread {
                    cat_id: cat_id.to_string(),
                    store,
                    posting: AtomicUsize::new(0),
                    post_error: Mutex::new(None),
                })
            })
            .clone()
    }

    pub fn get(&self, cat_id: &str) -> Option<Arc<CommentThread>> {
        self.threads().get(cat_id).cloned()
    }

    pub fn is_open(&self, cat_id: &str) -> bool {
        self.threads().contains_key(cat_id)
    }

    /// Forget the thread for `cat_id`. Loads still in flight are ignored.
    pub fn close(&self, cat_id: &str) -> bool {
        match self.threads().remove(cat_id) {
            Some(thread) => {
                thread.store.close();
                true
            }
            None => false,
        }
    }

    /// Close every open thread. Returns how many were open.
    pub fn close_all(&self) -> usize {
        let drained: Vec<_> = self.threads().drain().map(|(_, thread)| thread).collect();
        for thread in &drained {
            thread.store.close();
        }
        drained.len()
    }

    /// Post `text` under `cat_id` as `author`.
    ///
    /// The comment appears at the front of the thread at once under a local
    /// id, is swapped for the server's copy on success, and is removed on
    /// failure.
    pub async fn post_comment(
        &self,
        cat_id: &str,
        text: &str,
        author: UserSummary,
    ) -> Result<Comment, SyncError> {
        let body = text.trim();
        if body.is_empty() {
            return Err(SyncError::Rejected("Comment cannot be empty.".into()));
        }

        let thread = self.thread(cat_id);
        let _posting = Posting::start(&thread.posting);
        *thread.post_error_slot() = None;

        let local_id = format!("local-{}", self.local_ids.fetch_add(1, Ordering::Relaxed));
        let pending = Comment::pending(local_id.clone(), cat_id, body.to_string(), author);
        thread.store.prepend(pending);
        debug!(cat_id, local_id = %local_id, "comment pending");

        match self.api.post_comment(cat_id, body).await {
            Ok(comment) => {
                if !thread.store.replace(&local_id, comment.clone()) {
                    thread.store.prepend(comment.clone());
                }
                self.changes.emit(&ChangeEvent::EntityPatched {
                    id: comment.id.clone(),
                });
                Ok(comment)
            }
            Err(err) => {
                thread.store.remove(&local_id);
                if let Some(message) = err.display_message() {
                    warn!(cat_id, error = %err, "comment post failed");
                    self.changes.emit(&ChangeEvent::MutationFailed {
                        id: local_id,
                        message,
                    });
                }
                *thread.post_error_slot() = Some(err.clone());
                Err(err)
            }
        }
    }

    fn threads(&self) -> MutexGuard<'_, HashMap<String, Arc<CommentThread>>> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
