//! Optimistic mutations mirrored across every list holding an entity.
//!
//! A mutation snapshots each held copy, applies its delta to all of them
//! before the network call is issued, and afterwards either reconciles
//! every copy to the server's value or restores the snapshots. Mutations
//! on the same entity field are serialized through a [`MutationQueue`].

mod authors;
mod coordinator;
mod follows;
mod likes;
mod membership;
mod mirror;
mod queue;

pub use authors::AuthorMirror;
pub use coordinator::MutationCoordinator;
pub use mirror::{Mirror, MirrorSet, OptimisticMutation};
pub use queue::{MutationQueue, MutationTurn};
