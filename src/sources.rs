//! Concrete page sources, one per list the client shows.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::api::{FeedScope, Relationship, RemoteApi, SearchMode};
use crate::error::SyncError;
use crate::model::{Cat, CollectionSummary, Comment, Cursor, FollowEdge, Page};
use crate::paged::PageSource;

/// The home feed or one user's posts.
pub struct FeedSource {
    api: Arc<dyn RemoteApi>,
}

impl FeedSource {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource for FeedSource {
    type Item = Cat;
    type Target = FeedScope;

    fn label(&self) -> &'static str {
        "feed"
    }

    async fn fetch(
        &self,
        scope: &FeedScope,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<Cat>, SyncError> {
        self.api.list_cats(limit, cursor, scope).await
    }
}

/// A normalized tag query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub tags: Vec<String>,
    pub mode: SearchMode,
}

impl SearchQuery {
    pub fn new(tags: Vec<String>, mode: SearchMode) -> Self {
        Self { tags, mode }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

pub struct SearchSource {
    api: Arc<dyn RemoteApi>,
}

impl SearchSource {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource for SearchSource {
    type Item = Cat;
    type Target = SearchQuery;

    fn label(&self) -> &'static str {
        "search"
    }

    async fn fetch(
        &self,
        query: &SearchQuery,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<Cat>, SyncError> {
        self.api
            .search_cats(&query.tags, query.mode, limit, cursor)
            .await
    }
}

/// One side of a user's follow graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeScope {
    pub username: String,
    pub relationship: Relationship,
}

impl EdgeScope {
    pub fn followers(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            relationship: Relationship::Followers,
        }
    }

    pub fn following(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            relationship: Relationship::Following,
        }
    }
}

pub struct EdgeSource {
    api: Arc<dyn RemoteApi>,
    label: &'static str,
}

impl EdgeSource {
    pub fn new(api: Arc<dyn RemoteApi>, relationship: Relationship) -> Self {
        let label = match relationship {
            Relationship::Followers => "followers",
            Relationship::Following => "following",
        };
        Self { api, label }
    }
}

#[async_trait]
impl PageSource for EdgeSource {
    type Item = FollowEdge;
    type Target = EdgeScope;

    fn label(&self) -> &'static str {
        self.label
    }

    async fn fetch(
        &self,
        scope: &EdgeScope,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<FollowEdge>, SyncError> {
        self.api
            .list_edges(&scope.username, scope.relationship, limit, cursor)
            .await
    }
}

/// Collections owned by one user.
pub struct CollectionListSource {
    api: Arc<dyn RemoteApi>,
}

impl CollectionListSource {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource for CollectionListSource {
    type Item = CollectionSummary;
    type Target = String;

    fn label(&self) -> &'static str {
        "collections"
    }

    async fn fetch(
        &self,
        owner: &String,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<CollectionSummary>, SyncError> {
        self.api.list_collections(owner, limit, cursor).await
    }
}

/// The cats of one collection. The collection header from the latest
/// response is kept alongside.
pub struct CollectionDetailSource {
    api: Arc<dyn RemoteApi>,
    header: Mutex<Option<CollectionSummary>>,
}

impl CollectionDetailSource {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            header: Mutex::new(None),
        }
    }

    /// Header of the collection last fetched, if it is `collection_id`.
    pub fn header(&self, collection_id: &str) -> Option<CollectionSummary> {
        self.header
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|header| header.id == collection_id)
            .cloned()
    }
}

#[async_trait]
impl PageSource for CollectionDetailSource {
    type Item = Cat;
    type Target = String;

    fn label(&self) -> &'static str {
        "collection"
    }

    async fn fetch(
        &self,
        collection_id: &String,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<Cat>, SyncError> {
        let page = self
            .api
            .get_collection(collection_id, limit, cursor)
            .await?;
        *self.header.lock().unwrap_or_else(PoisonError::into_inner) = Some(page.collection);
        Ok(page.cats)
    }
}

/// Comments under one cat, newest first.
pub struct CommentSource {
    api: Arc<dyn RemoteApi>,
}

impl CommentSource {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource for CommentSource {
    type Item = Comment;
    type Target = String;

    fn label(&self) -> &'static str {
        "comments"
    }

    async fn fetch(
        &self,
        cat_id: &String,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<Comment>, SyncError> {
        self.api.list_comments(cat_id, limit, cursor).await
    }
}
