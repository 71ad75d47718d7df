//! RemoteApi - the network collaborator consumed by the stores.
//!
//! The stores never see transport details. A transport implements
//! [`RemoteApi`] and can use [`decode_response`] to turn a raw
//! `(status, body)` pair into a typed payload or a classified [`SyncError`].

mod envelope;
mod media;
pub mod wire;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::model::{
    Cat, CatLocation, CollectionSummary, Comment, Cursor, FollowEdge, Page, UserSummary,
};

pub use envelope::{decode_envelope, decode_response};
pub use media::MediaPayload;

/// Which cats a feed lists: everyone's, or one user's posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FeedScope {
    pub username: Option<String>,
}

impl FeedScope {
    pub fn everyone() -> Self {
        Self::default()
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Match cats carrying any of the tags.
    #[default]
    Any,
    /// Match cats carrying every tag.
    All,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Any => "any",
            SearchMode::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Followers,
    Following,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Followers => "followers",
            Relationship::Following => "following",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    pub fn from_follow(follow: bool) -> Self {
        if follow {
            FollowAction::Follow
        } else {
            FollowAction::Unfollow
        }
    }

    pub fn is_follow(&self) -> bool {
        matches!(self, FollowAction::Follow)
    }
}

/// Server-confirmed like state for one cat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeReceipt {
    pub cat_id: String,
    pub like_count: u64,
    pub viewer_has_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowReceipt {
    pub status: String,
}

impl FollowReceipt {
    /// The follow state the server reports, if the status is recognised.
    pub fn is_following(&self) -> Option<bool> {
        match self.status.as_str() {
            "followed" | "following" => Some(true),
            "unfollowed" | "not_following" => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipReceipt {
    pub collection_id: String,
    pub item_count: u64,
}

/// One page of a collection's cats together with its header.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPage {
    pub collection: CollectionSummary,
    pub cats: Page<Cat>,
}

/// Fields for a new cat post.
#[derive(Debug, Clone, PartialEq)]
pub struct CatDraft {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub location: Option<CatLocation>,
    pub media: MediaPayload,
}

impl CatDraft {
    /// Tags as the comma-joined field the server expects, or `None` when empty.
    pub fn tag_field(&self) -> Option<String> {
        if self.tags.is_empty() {
            None
        } else {
            Some(self.tags.join(","))
        }
    }
}

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Profile of `username`, or of the signed-in user when `None`.
    async fn fetch_profile(&self, username: Option<&str>) -> Result<UserSummary, SyncError>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserSummary, SyncError>;

    async fn change_avatar(&self, media: &MediaPayload) -> Result<UserSummary, SyncError>;

    async fn get_cat(&self, cat_id: &str) -> Result<Cat, SyncError>;

    async fn list_cats(
        &self,
        limit: usize,
        cursor: Option<&Cursor>,
        scope: &FeedScope,
    ) -> Result<Page<Cat>, SyncError>;

    async fn search_cats(
        &self,
        tags: &[String],
        mode: SearchMode,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Cat>, SyncError>;

    async fn mutate_like(&self, cat_id: &str, like: bool) -> Result<LikeReceipt, SyncError>;

    async fn mutate_follow(
        &self,
        username: &str,
        action: FollowAction,
    ) -> Result<FollowReceipt, SyncError>;

    async fn list_edges(
        &self,
        username: &str,
        relationship: Relationship,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<FollowEdge>, SyncError>;

    async fn post_comment(&self, cat_id: &str, text: &str) -> Result<Comment, SyncError>;

    async fn list_comments(
        &self,
        cat_id: &str,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Comment>, SyncError>;

    async fn create_cat(&self, draft: &CatDraft) -> Result<Cat, SyncError>;

    async fn list_collections(
        &self,
        owner: &str,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<CollectionSummary>, SyncError>;

    async fn get_collection(
        &self,
        collection_id: &str,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<CollectionPage, SyncError>;

    async fn mutate_membership(
        &self,
        collection_id: &str,
        cat_id: &str,
        add: bool,
    ) -> Result<MembershipReceipt, SyncError>;
}
