//! Change notifications that are not list state.
//!
//! List snapshots are published per store through `watch` channels (see
//! `PagedStore::subscribe`). Everything else the view may react to, such as
//! a transient "like failed" message, goes through a [`ChangeFeed`].

mod change_feed;
#[cfg(feature = "emitter")]
mod emitter;

use serde::{Deserialize, Serialize};

pub use change_feed::{ChangeFeed, ListenerId};
#[cfg(feature = "emitter")]
pub use emitter::EmitterBridge;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// A store committed a page (refresh or load-more).
    ListCommitted { store: String, len: usize },
    /// Every held copy of an entity was patched to a resolved value.
    EntityPatched { id: String },
    /// A mutation was rolled back; `message` is for a transient notice.
    MutationFailed { id: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    ListCommitted,
    EntityPatched,
    MutationFailed,
}

impl ChangeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeKind::ListCommitted => "list_committed",
            ChangeKind::EntityPatched => "entity_patched",
            ChangeKind::MutationFailed => "mutation_failed",
        }
    }
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::ListCommitted { .. } => ChangeKind::ListCommitted,
            ChangeEvent::EntityPatched { .. } => ChangeKind::EntityPatched,
            ChangeEvent::MutationFailed { .. } => ChangeKind::MutationFailed,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}
