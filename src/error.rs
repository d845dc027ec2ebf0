use thiserror::Error;

/// Errors reported by [`AVLTree`](crate::collections::AVLTree) operations.
///
/// None of these leave the tree modified.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree is empty")]
    Empty,

    #[error("value not found in tree")]
    NotFound,
}

/// Errors reported by [`IndexedDHeap`](crate::collections::IndexedDHeap) operations.
///
/// A failed call never mutates the heap.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The key index is outside `[0, max_size)`.
    #[error("key index {ki} out of bounds (max size {max_size})")]
    KeyIndexOutOfBounds { ki: usize, max_size: usize },

    #[error("key index {0} not in heap")]
    KeyIndexNotFound(usize),

    #[error("key index {0} already in heap")]
    KeyIndexOccupied(usize),

    #[error("heap is empty")]
    Empty,
}

/// A broken structural invariant, as found by the `validate` checkers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("node {node}: stored height {stored}, expected {expected}")]
    Height {
        node: u32,
        stored: i32,
        expected: i32,
    },

    #[error("node {node}: stored balance factor {stored}, expected {expected}")]
    BalanceFactor {
        node: u32,
        stored: i32,
        expected: i32,
    },

    #[error("node {node}: balance factor {balance_factor} outside [-1, 1]")]
    Unbalanced { node: u32, balance_factor: i32 },

    #[error("node {node}: parent link does not point back to {expected}")]
    ParentLink { node: u32, expected: u32 },

    #[error("node {node}: in-order successor is not greater")]
    Order { node: u32 },

    #[error("counted {counted} reachable nodes, expected {expected}")]
    Count { counted: usize, expected: usize },

    #[error("position map and inverse map disagree at key index {ki}")]
    PositionMap { ki: usize },

    #[error("node index {ni} is smaller than its parent")]
    HeapOrder { ni: usize },

    #[error("key index {ki}: value presence does not match membership")]
    ValuePresence { ki: usize },
}
