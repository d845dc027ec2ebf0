//! Arena-backed balanced search tree and indexed D-ary min-heap.
//!
//! - [`AVLTree`](collections::AVLTree): self-balancing binary search tree whose
//!   nodes live in a contiguous arena and link to each other by index.
//! - [`IndexedDHeap`](collections::IndexedDHeap): min-heap over caller-assigned
//!   key indices, supporting `update`, `decrease_key` and `increase_key`.
//!
//! ```rust
//! use balanced_collections::collections::{AVLTree, IndexedDHeap};
//!
//! let tree: AVLTree<i32> = [5, 3, 7, 1, 13, 65].into_iter().collect();
//! assert_eq!(tree.root().unwrap().right().unwrap().data(), &13);
//!
//! let mut heap = IndexedDHeap::new(2, 15);
//! heap.insert(2, 10).unwrap();
//! heap.insert(5, 1).unwrap();
//! assert_eq!(heap.peek_min(), Some((5, &1)));
//! ```
//!
//! Neither structure synchronizes access: share one across threads behind a
//! lock that covers each whole operation.

pub mod collections;
pub mod error;
pub mod pod;

pub use error::{HeapError, InvariantViolation, TreeError};
