use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::warn;

use super::{Mirror, MirrorSet, MutationQueue};
use crate::api::RemoteApi;
use crate::error::SyncError;
use crate::model::{Cat, CollectionSummary, FollowEdge, UserSummary};
use crate::observe::{ChangeEvent, ChangeFeed};

/// Applies likes, follows and collection-membership changes optimistically
/// to every tracked list, then reconciles or rolls back.
pub struct MutationCoordinator {
    pub(super) api: Arc<dyn RemoteApi>,
    pub(super) queue: MutationQueue,
    pub(super) cats: MirrorSet<Cat>,
    pub(super) edges: MirrorSet<FollowEdge>,
    pub(super) users: MirrorSet<UserSummary>,
    pub(super) collections: MirrorSet<CollectionSummary>,
    pub(super) viewer_following: RwLock<Option<Weak<dyn Mirror<FollowEdge>>>>,
    pub(super) changes: ChangeFeed,
}

impl MutationCoordinator {
    pub fn new(api: Arc<dyn RemoteApi>, changes: ChangeFeed) -> Self {
        Self {
            api,
            queue: MutationQueue::new(),
            cats: MirrorSet::new(),
            edges: MirrorSet::new(),
            users: MirrorSet::new(),
            collections: MirrorSet::new(),
            viewer_following: RwLock::new(None),
            changes,
        }
    }

    /// Lists holding cats: feed, search results, collection details.
    pub fn cats(&self) -> &MirrorSet<Cat> {
        &self.cats
    }

    /// Lists holding follow edges.
    pub fn edges(&self) -> &MirrorSet<FollowEdge> {
        &self.edges
    }

    /// Profile copies: the open profile and the authors of listed cats.
    pub fn users(&self) -> &MirrorSet<UserSummary> {
        &self.users
    }

    pub fn collections(&self) -> &MirrorSet<CollectionSummary> {
        &self.collections
    }

    /// The signed-in user's own following list; follows splice into it.
    pub fn set_viewer_following(&self, list: Arc<dyn Mirror<FollowEdge>>) {
        self.edges.track(list.clone());
        let mut slot = self
            .viewer_following
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::downgrade(&list));
    }

    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    pub fn queue(&self) -> &MutationQueue {
        &self.queue
    }

    pub(super) fn viewer_following(&self) -> Option<Arc<dyn Mirror<FollowEdge>>> {
        self.viewer_following
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }

    pub(super) fn report_patched(&self, id: &str) {
        self.changes.emit(&ChangeEvent::EntityPatched { id: id.to_string() });
    }

    /// Surface a rolled-back mutation. Cancellations stay silent.
    pub(super) fn report_failure(&self, id: &str, err: &SyncError) {
        let Some(message) = err.display_message() else {
            return;
        };
        warn!(id, error = %err, "mutation rolled back");
        self.changes.emit(&ChangeEvent::MutationFailed {
            id: id.to_string(),
            message,
        });
    }
}
