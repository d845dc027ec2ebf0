pub mod avl_tree;
pub mod indexed_heap;

pub use avl_tree::AVLTree;
pub use indexed_heap::HeapConfig;
pub use indexed_heap::IndexedDHeap;
