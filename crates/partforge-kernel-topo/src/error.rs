use thiserror::Error;

use crate::EntityKind;

/// Errors raised when resolving a handle against a [`TopologyArena`](crate::TopologyArena).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// The handle was issued before the arena was last reset.
    #[error("stale handle #{id}: issued by generation {handle_generation}, arena is at {arena_generation}")]
    StaleHandle {
        /// Entity id carried by the handle.
        id: u32,
        /// Generation stamped into the handle.
        handle_generation: u32,
        /// Current arena generation.
        arena_generation: u32,
    },

    /// The handle was issued by a different arena.
    #[error("handle #{id} belongs to another arena (generation {handle_generation})")]
    ForeignHandle {
        /// Entity id carried by the handle.
        id: u32,
        /// Generation stamped into the handle.
        handle_generation: u32,
    },

    /// No entity with this id exists.
    #[error("entity #{0} not found")]
    NotFound(u32),

    /// The entity exists but has a different kind than the handle names.
    #[error("entity #{id} is a {found:?}, expected {expected:?}")]
    KindMismatch {
        /// Entity id.
        id: u32,
        /// Kind the handle expected.
        expected: EntityKind,
        /// Kind actually stored.
        found: EntityKind,
    },
}
