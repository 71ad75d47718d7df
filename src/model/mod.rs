//! Entity model - value types mirrored by the stores.
//!
//! Every entity is identified by an opaque, stable string id. Descriptive
//! fields are immutable; the only fields a store may patch in place are the
//! social counters (`like_count`, `viewer_has_liked`, `is_followed`,
//! `follower_count`, `item_count`).

mod cat;
mod collection;
mod comment;
mod page;
mod user;

pub use cat::{Cat, CatLocation, LikeState};
pub use collection::CollectionSummary;
pub use comment::Comment;
pub use page::{Cursor, Page};
pub use user::{FollowEdge, UserSummary};

/// Types that carry a stable identity, used for de-duplication and patching.
pub trait Identified: Clone + Send + Sync + 'static {
    /// Returns the unique identifier for this entity.
    fn id(&self) -> &str;
}
