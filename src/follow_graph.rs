use std::sync::Arc;

use crate::api::{Relationship, RemoteApi};
use crate::config::Paging;
use crate::observe::ChangeFeed;
use crate::paged::{LoadOutcome, PagedStore};
use crate::sources::{EdgeScope, EdgeSource};

/// Followers and following lists of one user, switched and refreshed together.
pub struct FollowGraph {
    followers: Arc<PagedStore<EdgeSource>>,
    following: Arc<PagedStore<EdgeSource>>,
}

impl FollowGraph {
    pub fn new(api: Arc<dyn RemoteApi>, paging: Paging, changes: ChangeFeed) -> Self {
        let followers = PagedStore::new(EdgeSource::new(api.clone(), Relationship::Followers), None, paging)
            .with_changes(changes.clone());
        let following = PagedStore::new(EdgeSource::new(api, Relationship::Following), None, paging)
            .with_changes(changes);
        Self {
            followers: Arc::new(followers),
            following: Arc::new(following),
        }
    }

    pub fn followers(&self) -> &Arc<PagedStore<EdgeSource>> {
        &self.followers
    }

    pub fn following(&self) -> &Arc<PagedStore<EdgeSource>> {
        &self.following
    }

    pub fn list(&self, relationship: Relationship) -> &Arc<PagedStore<EdgeSource>> {
        match relationship {
            Relationship::Followers => &self.followers,
            Relationship::Following => &self.following,
        }
    }

    /// The user both lists currently show.
    pub fn username(&self) -> Option<String> {
        self.followers.target().map(|scope| scope.username)
    }

    /// Point both lists at `username` and load their first pages concurrently.
    pub async fn refresh(&self, username: &str) -> (LoadOutcome, LoadOutcome) {
        tokio::join!(
            self.followers.refresh_target(EdgeScope::followers(username)),
            self.following.refresh_target(EdgeScope::following(username)),
        )
    }
}
