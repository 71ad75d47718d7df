//! Response payload shapes as the server sends them, with conversions into
//! the store-facing types. Transports decode into these with
//! [`decode_response`](super::decode_response).

use serde::Deserialize;

use super::{CollectionPage, FollowReceipt, LikeReceipt, MembershipReceipt};
use crate::model::{Cat, CollectionSummary, Comment, Cursor, FollowEdge, Page, UserSummary};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatListBody {
    pub cats: Vec<Cat>,
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

impl From<CatListBody> for Page<Cat> {
    fn from(body: CatListBody) -> Self {
        Page::new(body.cats, body.next_cursor)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatBody {
    pub cat: Cat,
}

impl From<CatBody> for Cat {
    fn from(body: CatBody) -> Self {
        body.cat
    }
}

/// Profile fetch, profile update and avatar change all answer with this.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfileBody {
    pub user: UserSummary,
}

impl From<UserProfileBody> for UserSummary {
    fn from(body: UserProfileBody) -> Self {
        body.user
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeBody {
    pub cat_id: String,
    pub likes: u64,
    pub liked: bool,
}

impl From<LikeBody> for LikeReceipt {
    fn from(body: LikeBody) -> Self {
        LikeReceipt {
            cat_id: body.cat_id,
            like_count: body.likes,
            viewer_has_liked: body.liked,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowBody {
    pub status: String,
}

impl From<FollowBody> for FollowReceipt {
    fn from(body: FollowBody) -> Self {
        FollowReceipt {
            status: body.status,
        }
    }
}

/// Follower and following listings share a shape but name the array differently.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeListBody {
    #[serde(alias = "following")]
    pub followers: Vec<FollowEdge>,
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

impl From<EdgeListBody> for Page<FollowEdge> {
    fn from(body: EdgeListBody) -> Self {
        Page::new(body.followers, body.next_cursor)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentBody {
    pub comment: Comment,
}

/// Comment listings paginate by page number; it is carried as an opaque cursor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListBody {
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub next_page: Option<u64>,
}

impl From<CommentListBody> for Page<Comment> {
    fn from(body: CommentListBody) -> Self {
        let next = body.next_page.map(|page| Cursor::new(page.to_string()));
        Page::new(body.comments, next)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionListBody {
    pub collections: Vec<CollectionSummary>,
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

impl From<CollectionListBody> for Page<CollectionSummary> {
    fn from(body: CollectionListBody) -> Self {
        Page::new(body.collections, body.next_cursor)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetailBody {
    pub collection: CollectionSummary,
    pub cats: Vec<Cat>,
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

impl From<CollectionDetailBody> for CollectionPage {
    fn from(body: CollectionDetailBody) -> Self {
        CollectionPage {
            collection: body.collection,
            cats: Page::new(body.cats, body.next_cursor),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipBody {
    pub collection_id: String,
    pub cat_count: u64,
}

impl From<MembershipBody> for MembershipReceipt {
    fn from(body: MembershipBody) -> Self {
        MembershipReceipt {
            collection_id: body.collection_id,
            item_count: body.cat_count,
        }
    }
}
