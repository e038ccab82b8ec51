//! Error types for `RBTreeMap`.

use alloc::collections::TryReserveError;

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the fallible `RBTreeMap` operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The allocator could not provide room for another entry. The map is unchanged.
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    /// The map already holds as many entries as its handles can address. The map is
    /// unchanged.
    #[error("capacity exceeded: at most {limit} entries")]
    CapacityExceeded { limit: usize },

    /// [`RBTreeMap::validate`](crate::RBTreeMap::validate) found a broken structural invariant.
    #[error("red-black invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// A structural property of the tree that does not hold.
///
/// `node` fields are arena indices, only meaningful for debugging.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("the root is red")]
    RedRoot,

    #[error("the root has a parent")]
    RootHasParent,

    #[error("the sentinel is not black with self-referencing links")]
    DirtySentinel,

    #[error("red node {node} has a red child")]
    RedRedLink { node: usize },

    #[error("black-height mismatch at node {node}: left {left}, right {right}")]
    BlackHeightMismatch { node: usize, left: usize, right: usize },

    #[error("node {node} does not point back at its parent")]
    BrokenParentLink { node: usize },

    #[error("key of node {node} is out of order")]
    KeyOutOfOrder { node: usize },

    #[error("length mismatch: recorded {recorded}, reachable {reachable}")]
    LengthMismatch { recorded: usize, reachable: usize },
}
