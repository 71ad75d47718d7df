mod cell;
mod comments;
mod compose;
mod config;
mod detail;
mod error;
mod flight;
mod follow_graph;
mod profile;
mod root;
mod search;
mod sources;
mod wait;

pub mod api;
pub mod model;
pub mod mutation;
pub mod observe;
pub mod paged;

pub use cell::{EntityCell, EntityState};
pub use comments::{CommentThread, CommentThreads};
pub use compose::Composer;
pub use config::{Paging, SyncConfig};
pub use detail::CatDetail;
pub use error::SyncError;
pub use flight::{Flight, SingleFlight};
pub use follow_graph::FollowGraph;
pub use profile::ProfileStore;
pub use root::SyncRoot;
pub use search::{normalize_tags, SearchController};
pub use sources::{
    CollectionDetailSource, CollectionListSource, CommentSource, EdgeScope, EdgeSource,
    FeedSource, SearchQuery, SearchSource,
};
pub use wait::{TokioWait, WaitMs};

pub use api::{FeedScope, ProfileUpdate, RemoteApi, SearchMode};
pub use model::{Cat, Comment, Cursor, Identified, Page, UserSummary};
pub use mutation::MutationCoordinator;
pub use observe::{ChangeEvent, ChangeFeed, ChangeKind};
pub use paged::{ListState, LoadOutcome, PageSource, PagedStore};

// Re-export the EventEmitter so EmitterBridge callers need no direct dependency
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
