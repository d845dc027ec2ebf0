use log::{debug, trace};
use std::cmp::{max, Ordering};
use std::fmt;

use crate::error::{InvariantViolation, TreeError};

// Constant to represent an empty link.
const SENTINEL: u32 = 0;

// Enum representing the fields of a node.
#[derive(Copy, Clone)]
enum Register {
    Left,
    Right,
    Parent,
    Height,
}

/// Macro to access a node.
macro_rules! node {
    ( $array:expr, $index:expr ) => {
        $array[($index - 1) as usize]
    };
}

/// AVL tree struct, which is a self-balancing binary search tree. Values in the
/// tree are stored as such the height of two sibling subtrees differ by one at
/// most.
///
/// Nodes live in a contiguous arena and refer to each other by index, so the
/// parent back-reference of a node is a plain index with no ownership attached.
/// Slots of removed nodes are kept on a free list and reused by later inserts.
pub struct AVLTree<T: Ord> {
    /// Index of the root node.
    root: u32,

    /// Number of values in the tree.
    size: usize,

    /// Head of the free list of removed slots.
    free_list_head: u32,

    /// Array of nodes to store the tree.
    nodes: Vec<Node<T>>,
}

impl<T: Ord> Default for AVLTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> AVLTree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            root: SENTINEL,
            size: 0,
            free_list_head: SENTINEL,
            nodes: Vec::new(),
        }
    }

    /// Returns the number of values in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Indicates whether the tree is empty or not.
    pub fn is_empty(&self) -> bool {
        self.root == SENTINEL
    }

    /// Returns the height of the tree, counted in edges from the root to its
    /// furthest leaf.
    pub fn height(&self) -> Option<u32> {
        (self.root != SENTINEL).then(|| self.get_register(self.root, Register::Height))
    }

    /// Removes every value from the tree.
    pub fn clear(&mut self) {
        self.root = SENTINEL;
        self.size = 0;
        self.free_list_head = SENTINEL;
        self.nodes.clear();
    }

    /// Returns a cursor on the root node, if the tree is not empty.
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        NodeRef::new(self, self.root)
    }

    /// Checks whether a value is present in the tree or not.
    pub fn contains(&self, data: &T) -> bool {
        self.find(data).is_some()
    }

    /// Returns the stored value equal to `data`, if one is found.
    pub fn get(&self, data: &T) -> Option<&T> {
        self.find(data).map(|index| self.data(index))
    }

    // Find the lowest entry.
    pub fn min(&self) -> Option<&T> {
        self.extreme(Register::Left)
    }

    // Find the highest entry.
    pub fn max(&self) -> Option<&T> {
        self.extreme(Register::Right)
    }

    /// Inserts a value on the tree.
    ///
    /// Returns `false`, leaving the tree untouched, if an equal value is
    /// already present.
    ///
    /// # Arguments
    ///
    /// * `data` - the value to insert.
    pub fn insert(&mut self, data: T) -> bool {
        let mut parent = SENTINEL;
        let mut branch = Register::Left;
        let mut reference_node = self.root;

        while reference_node != SENTINEL {
            parent = reference_node;

            branch = match data.cmp(self.data(reference_node)) {
                Ordering::Less => Register::Left,
                Ordering::Greater => Register::Right,
                Ordering::Equal => {
                    debug!("value already present in tree, not inserted");
                    return false;
                }
            };

            reference_node = self.get_register(parent, branch);
        }

        let index = self.add(data, parent);

        if parent == SENTINEL {
            self.root = index;
        } else {
            self.set_register(parent, branch, index);
        }

        self.retrace(parent);

        true
    }

    /// Removes a value from the tree, returning the stored value.
    ///
    /// A node with two children takes the value of its in-order predecessor
    /// (the rightmost node of its left subtree), and the predecessor's node,
    /// which has no right child, is unlinked instead.
    pub fn remove(&mut self, data: &T) -> Result<T, TreeError> {
        if self.root == SENTINEL {
            debug!("tree is empty, nothing to remove");
            return Err(TreeError::Empty);
        }

        let node_index = match self.find(data) {
            Some(index) => index,
            None => {
                debug!("value not found in tree, nothing to remove");
                return Err(TreeError::NotFound);
            }
        };

        let left = self.get_register(node_index, Register::Left);
        let right = self.get_register(node_index, Register::Right);

        let target = if left != SENTINEL && right != SENTINEL {
            let mut predecessor = left;

            while self.get_register(predecessor, Register::Right) != SENTINEL {
                predecessor = self.get_register(predecessor, Register::Right);
            }

            self.swap_data(node_index, predecessor);
            predecessor
        } else {
            node_index
        };

        // the target has at most one child at this point
        let child = match self.get_register(target, Register::Left) {
            SENTINEL => self.get_register(target, Register::Right),
            index => index,
        };
        let parent = self.get_register(target, Register::Parent);

        self.replace_child(parent, target, child);
        let removed = self.remove_node(target).ok_or(TreeError::NotFound)?;

        self.retrace(parent);

        Ok(removed)
    }

    /// Returns a pre-order (node, left, right) traversal of the values.
    pub fn preorder(&self) -> Preorder<'_, T> {
        Preorder {
            tree: self,
            stack: self.root_stack(),
        }
    }

    /// Returns an in-order traversal of the values, which yields them in
    /// ascending order.
    pub fn inorder(&self) -> Inorder<'_, T> {
        Inorder {
            tree: self,
            stack: Vec::new(),
            current: self.root,
        }
    }

    /// Returns a post-order (left, right, node) traversal of the values.
    pub fn postorder(&self) -> Postorder<'_, T> {
        Postorder {
            tree: self,
            stack: self
                .root_stack()
                .into_iter()
                .map(|index| (index, false))
                .collect(),
        }
    }

    /// Same as [`AVLTree::inorder`].
    pub fn iter(&self) -> Inorder<'_, T> {
        self.inorder()
    }

    /// Walks the whole tree and checks the structural invariants: parent
    /// back-references, stored heights and balance factors, the AVL balance
    /// rule, the search order and the value count.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.root != SENTINEL {
            let parent = self.get_register(self.root, Register::Parent);

            if parent != SENTINEL {
                return Err(InvariantViolation::ParentLink {
                    node: self.root,
                    expected: SENTINEL,
                });
            }

            self.validate_subtree(self.root)?;
        }

        let mut inorder = self.inorder();
        let mut previous = inorder.next_index();
        let mut counted = usize::from(previous.is_some());

        while let Some(index) = inorder.next_index() {
            if let Some(previous) = previous {
                if self.data(previous) >= self.data(index) {
                    return Err(InvariantViolation::Order { node: previous });
                }
            }

            previous = Some(index);
            counted += 1;
        }

        if counted != self.size {
            return Err(InvariantViolation::Count {
                counted,
                expected: self.size,
            });
        }

        Ok(())
    }

    // Checks a subtree, returning its recomputed height.
    fn validate_subtree(&self, index: u32) -> Result<i32, InvariantViolation> {
        let mut heights = [-1, -1];

        for (slot, branch) in [Register::Left, Register::Right].into_iter().enumerate() {
            let child = self.get_register(index, branch);

            if child != SENTINEL {
                if self.get_register(child, Register::Parent) != index {
                    return Err(InvariantViolation::ParentLink {
                        node: child,
                        expected: index,
                    });
                }

                heights[slot] = self.validate_subtree(child)?;
            }
        }

        let [left_height, right_height] = heights;
        let expected = 1 + max(left_height, right_height);
        let stored = self.get_register(index, Register::Height) as i32;

        if stored != expected {
            return Err(InvariantViolation::Height {
                node: index,
                stored,
                expected,
            });
        }

        let balance_factor = right_height - left_height;
        let stored = node!(self.nodes, index).balance_factor as i32;

        if stored != balance_factor {
            return Err(InvariantViolation::BalanceFactor {
                node: index,
                stored,
                expected: balance_factor,
            });
        }

        if !(-1..=1).contains(&balance_factor) {
            return Err(InvariantViolation::Unbalanced {
                node: index,
                balance_factor,
            });
        }

        Ok(expected)
    }

    fn find(&self, data: &T) -> Option<u32> {
        let mut reference_node = self.root;

        while reference_node != SENTINEL {
            reference_node = match data.cmp(self.data(reference_node)) {
                Ordering::Less => self.get_register(reference_node, Register::Left),
                Ordering::Greater => self.get_register(reference_node, Register::Right),
                Ordering::Equal => return Some(reference_node),
            };
        }

        None
    }

    fn extreme(&self, branch: Register) -> Option<&T> {
        let mut node = self.root;

        if node == SENTINEL {
            return None;
        }

        while self.get_register(node, branch) != SENTINEL {
            node = self.get_register(node, branch);
        }

        Some(self.data(node))
    }

    fn root_stack(&self) -> Vec<u32> {
        if self.root == SENTINEL {
            Vec::new()
        } else {
            vec![self.root]
        }
    }

    /// Adds a node to the arena, reusing a free slot when one is available.
    ///
    /// # Arguments
    ///
    /// * `data` - the value of the node.
    /// * `parent` - index of the parent node.
    fn add(&mut self, data: T, parent: u32) -> u32 {
        let index = if self.free_list_head != SENTINEL {
            let free_node = self.free_list_head;
            // the height register links the free list
            self.free_list_head = self.get_register(free_node, Register::Height);
            free_node
        } else {
            self.nodes.push(Node::default());

            match u32::try_from(self.nodes.len()) {
                Ok(index) => index,
                Err(_) => panic!("tree is full ({} nodes)", self.size),
            }
        };

        node!(self.nodes, index).initialize(data, parent);
        self.size += 1;

        index
    }

    /// Remove a node from the arena, returning its value.
    fn remove_node(&mut self, index: u32) -> Option<T> {
        let node = &mut node!(self.nodes, index);
        let data = node.data.take();

        node.registers = [SENTINEL, SENTINEL, SENTINEL, self.free_list_head];
        node.balance_factor = 0;

        self.free_list_head = index;
        self.size -= 1;

        data
    }

    /// Walks from `index` up to the root, refreshing heights and balance
    /// factors and rebalancing every node found out of balance.
    fn retrace(&mut self, mut index: u32) {
        while index != SENTINEL {
            self.update(index);
            let subtree = self.balance(index);
            index = self.get_register(subtree, Register::Parent);
        }
    }

    /// Rebalances the subtree rooted at `index`, returning its new root.
    ///
    /// A child balance factor of 0 is only possible after a removal; it is
    /// resolved by the single rotation.
    fn balance(&mut self, index: u32) -> u32 {
        match node!(self.nodes, index).balance_factor {
            -2 => {
                let left = self.get_register(index, Register::Left);

                if node!(self.nodes, left).balance_factor <= 0 {
                    self.left_left_case(index)
                } else {
                    self.left_right_case(index)
                }
            }
            2 => {
                let right = self.get_register(index, Register::Right);

                if node!(self.nodes, right).balance_factor >= 0 {
                    self.right_right_case(index)
                } else {
                    self.right_left_case(index)
                }
            }
            _ => index,
        }
    }

    fn left_left_case(&mut self, index: u32) -> u32 {
        self.right_rotate(index)
    }

    fn left_right_case(&mut self, index: u32) -> u32 {
        self.left_rotate(self.get_register(index, Register::Left));
        self.left_left_case(index)
    }

    fn right_right_case(&mut self, index: u32) -> u32 {
        self.left_rotate(index)
    }

    fn right_left_case(&mut self, index: u32) -> u32 {
        self.right_rotate(self.get_register(index, Register::Right));
        self.right_right_case(index)
    }

    /// Perform a left AVL rotation.
    ///
    /// # Arguments
    ///
    /// * `index` - index of the unbalanced node.
    fn left_rotate(&mut self, index: u32) -> u32 {
        trace!("left rotation at node {index}");

        let parent = self.get_register(index, Register::Parent);
        let right = self.get_register(index, Register::Right);
        let right_left = self.get_register(right, Register::Left);

        self.update_child(index, Register::Right, right_left);
        self.update_child(right, Register::Left, index);
        self.replace_child(parent, index, right);

        self.update(index);
        self.update(right);

        right
    }

    /// Perform a right AVL rotation.
    ///
    /// # Arguments
    ///
    /// * `index` - index of the unbalanced node.
    fn right_rotate(&mut self, index: u32) -> u32 {
        trace!("right rotation at node {index}");

        let parent = self.get_register(index, Register::Parent);
        let left = self.get_register(index, Register::Left);
        let left_right = self.get_register(left, Register::Right);

        self.update_child(index, Register::Left, left_right);
        self.update_child(left, Register::Right, index);
        self.replace_child(parent, index, left);

        self.update(index);
        self.update(left);

        left
    }

    /// Updates the child of a parent node and the child's back-reference.
    ///
    /// # Arguments
    ///
    /// * `parent` - index of the parent node.
    /// * `branch` - indicates whether it is the [`Register::Left`] or [`Register::Right`] child.
    /// * `child` - index of the child node.
    #[inline]
    fn update_child(&mut self, parent: u32, branch: Register, child: u32) {
        self.set_register(parent, branch, child);

        if child != SENTINEL {
            self.set_register(child, Register::Parent, parent);
        }
    }

    /// Puts `new` where `old` hangs from `parent`; a `SENTINEL` parent means
    /// `old` was the root, and the root is reassigned.
    fn replace_child(&mut self, parent: u32, old: u32, new: u32) {
        if parent == SENTINEL {
            self.root = new;

            if new != SENTINEL {
                self.set_register(new, Register::Parent, SENTINEL);
            }
        } else if self.get_register(parent, Register::Left) == old {
            self.update_child(parent, Register::Left, new);
        } else {
            self.update_child(parent, Register::Right, new);
        }
    }

    /// Updates the height and balance factor of a node.
    ///
    /// The height of a node is the height of its taller child's subtree plus one,
    /// with a missing child counting as -1.
    ///
    /// # Arguments
    ///
    /// * `index` - index of the node.
    fn update(&mut self, index: u32) {
        let left_height = self.subtree_height(self.get_register(index, Register::Left));
        let right_height = self.subtree_height(self.get_register(index, Register::Right));

        let node = &mut node!(self.nodes, index);
        node.set_register(Register::Height, (1 + max(left_height, right_height)) as u32);
        node.balance_factor = (right_height - left_height) as i8;
    }

    #[inline]
    fn subtree_height(&self, index: u32) -> i32 {
        if index != SENTINEL {
            self.get_register(index, Register::Height) as i32
        } else {
            -1
        }
    }

    fn swap_data(&mut self, a: u32, b: u32) {
        let data_b = node!(self.nodes, b).data.take();
        let data_a = std::mem::replace(&mut node!(self.nodes, a).data, data_b);
        node!(self.nodes, b).data = data_a;
    }

    #[inline(always)]
    fn data(&self, index: u32) -> &T {
        node!(self.nodes, index)
            .data
            .as_ref()
            .expect("invalid tree structure")
    }

    #[inline(always)]
    fn get_register(&self, index: u32, register: Register) -> u32 {
        node!(self.nodes, index).get_register(register)
    }

    #[inline(always)]
    fn set_register(&mut self, index: u32, register: Register, value: u32) {
        node!(self.nodes, index).set_register(register, value)
    }
}

impl<T: Ord> FromIterator<T> for AVLTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for AVLTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for data in iter {
            self.insert(data);
        }
    }
}

impl<'a, T: Ord> IntoIterator for &'a AVLTree<T> {
    type Item = &'a T;
    type IntoIter = Inorder<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inorder()
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for AVLTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inorder()).finish()
    }
}

/// Read-only cursor on a node of an [`AVLTree`].
pub struct NodeRef<'a, T: Ord> {
    tree: &'a AVLTree<T>,
    index: u32,
}

impl<'a, T: Ord> NodeRef<'a, T> {
    fn new(tree: &'a AVLTree<T>, index: u32) -> Option<Self> {
        (index != SENTINEL).then_some(Self { tree, index })
    }

    pub fn data(&self) -> &'a T {
        self.tree.data(self.index)
    }

    pub fn left(&self) -> Option<Self> {
        Self::new(self.tree, self.tree.get_register(self.index, Register::Left))
    }

    pub fn right(&self) -> Option<Self> {
        Self::new(self.tree, self.tree.get_register(self.index, Register::Right))
    }

    pub fn parent(&self) -> Option<Self> {
        Self::new(self.tree, self.tree.get_register(self.index, Register::Parent))
    }

    /// Number of edges between the node and its furthest leaf.
    pub fn height(&self) -> u32 {
        self.tree.get_register(self.index, Register::Height)
    }

    /// Height of the right subtree minus the height of the left subtree.
    pub fn balance_factor(&self) -> i8 {
        node!(self.tree.nodes, self.index).balance_factor
    }
}

impl<T: Ord> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Ord> Copy for NodeRef<'_, T> {}

impl<T: Ord> PartialEq for NodeRef<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl<T: Ord> Eq for NodeRef<'_, T> {}

impl<T: Ord + fmt::Debug> fmt::Debug for NodeRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("data", self.data())
            .field("height", &self.height())
            .field("balance_factor", &self.balance_factor())
            .finish()
    }
}

/// Pre-order traversal, see [`AVLTree::preorder`].
pub struct Preorder<'a, T: Ord> {
    tree: &'a AVLTree<T>,
    stack: Vec<u32>,
}

impl<'a, T: Ord> Iterator for Preorder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;

        for branch in [Register::Right, Register::Left] {
            let child = self.tree.get_register(index, branch);

            if child != SENTINEL {
                self.stack.push(child);
            }
        }

        Some(self.tree.data(index))
    }
}

/// In-order traversal, see [`AVLTree::inorder`].
pub struct Inorder<'a, T: Ord> {
    tree: &'a AVLTree<T>,
    stack: Vec<u32>,
    current: u32,
}

impl<T: Ord> Inorder<'_, T> {
    fn next_index(&mut self) -> Option<u32> {
        while self.current != SENTINEL {
            self.stack.push(self.current);
            self.current = self.tree.get_register(self.current, Register::Left);
        }

        let index = self.stack.pop()?;
        self.current = self.tree.get_register(index, Register::Right);

        Some(index)
    }
}

impl<'a, T: Ord> Iterator for Inorder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.next_index().map(|index| tree.data(index))
    }
}

/// Post-order traversal, see [`AVLTree::postorder`].
pub struct Postorder<'a, T: Ord> {
    tree: &'a AVLTree<T>,
    // (node, children already pushed)
    stack: Vec<(u32, bool)>,
}

impl<'a, T: Ord> Iterator for Postorder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, expanded) = self.stack.pop()?;

            if expanded {
                return Some(self.tree.data(index));
            }

            self.stack.push((index, true));

            for branch in [Register::Right, Register::Left] {
                let child = self.tree.get_register(index, branch);

                if child != SENTINEL {
                    self.stack.push((child, false));
                }
            }
        }
    }
}

struct Node<T> {
    /// Registers for a node. This is fixed to include:
    ///   [0] - left child
    ///   [1] - right child
    ///   [2] - parent
    ///   [3] - height (next free slot while the node is on the free list)
    registers: [u32; 4],
    /// Height of the right subtree minus the height of the left subtree.
    balance_factor: i8,
    /// The value of the node, `None` while the slot is free.
    data: Option<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            registers: [SENTINEL; 4],
            balance_factor: 0,
            data: None,
        }
    }
}

impl<T> Node<T> {
    fn initialize(&mut self, data: T, parent: u32) {
        self.registers = [SENTINEL, SENTINEL, parent, 0];
        self.balance_factor = 0;
        self.data = Some(data);
    }

    #[inline(always)]
    fn get_register(&self, register: Register) -> u32 {
        self.registers[register as usize]
    }

    #[inline(always)]
    fn set_register(&mut self, register: Register, value: u32) {
        self.registers[register as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_from(data: &[i32]) -> AVLTree<i32> {
        let mut tree = AVLTree::new();

        for value in data {
            assert!(tree.insert(*value));
        }

        tree.validate().unwrap();
        tree
    }

    #[test]
    fn test_insertion_no_rotation() {
        let tree = tree_from(&[5, 3, 7, 1, 13]);
        let root = tree.root().unwrap();

        assert_eq!(*root.data(), 5);
        assert_eq!(*root.left().unwrap().data(), 3);
        assert_eq!(*root.right().unwrap().data(), 7);
        assert_eq!(*root.left().unwrap().left().unwrap().data(), 1);
        assert_eq!(*root.right().unwrap().right().unwrap().data(), 13);

        assert_eq!(root.balance_factor(), 0);
        assert_eq!(root.left().unwrap().balance_factor(), -1);
        assert_eq!(root.right().unwrap().balance_factor(), 1);

        assert_eq!(root.height(), 2);
        assert_eq!(root.left().unwrap().height(), 1);
        assert_eq!(root.left().unwrap().left().unwrap().height(), 0);

        assert_eq!(root.left().unwrap().parent(), Some(root));
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn test_insertion_right_right_case() {
        let mut tree = tree_from(&[5, 3, 7, 1, 13]);
        tree.insert(65);
        tree.validate().unwrap();

        let root = tree.root().unwrap();
        let right = root.right().unwrap();

        assert_eq!(*root.data(), 5);
        assert_eq!(*right.data(), 13);
        assert_eq!(*right.left().unwrap().data(), 7);
        assert_eq!(*right.right().unwrap().data(), 65);
        assert_eq!(*root.left().unwrap().left().unwrap().data(), 1);

        assert_eq!(root.balance_factor(), 0);
        assert_eq!(right.balance_factor(), 0);
        assert_eq!(root.height(), 2);
        assert_eq!(right.height(), 1);

        assert_eq!(right.left().unwrap().parent(), Some(right));
        assert_eq!(right.right().unwrap().parent(), Some(right));
        assert_eq!(right.parent(), Some(root));
    }

    #[test]
    fn test_insertion_right_left_case() {
        let mut tree = tree_from(&[5, 3, 7, 1, 13]);
        tree.insert(11);
        tree.validate().unwrap();

        let right = tree.root().unwrap().right().unwrap();

        assert_eq!(*right.data(), 11);
        assert_eq!(*right.left().unwrap().data(), 7);
        assert_eq!(*right.right().unwrap().data(), 13);
        assert_eq!(right.balance_factor(), 0);
        assert_eq!(right.height(), 1);
    }

    #[test]
    fn test_insertion_left_left_case() {
        let mut tree = tree_from(&[5, 4, 7, 3, 13]);
        tree.insert(2);
        tree.validate().unwrap();

        let root = tree.root().unwrap();
        let left = root.left().unwrap();

        assert_eq!(*root.data(), 5);
        assert_eq!(*left.data(), 3);
        assert_eq!(*left.left().unwrap().data(), 2);
        assert_eq!(*left.right().unwrap().data(), 4);
        assert_eq!(*root.right().unwrap().right().unwrap().data(), 13);
        assert_eq!(left.balance_factor(), 0);
        assert_eq!(root.height(), 2);
    }

    #[test]
    fn test_insertion_left_right_case() {
        let mut tree = tree_from(&[7, 5, 8, 3, 13]);
        tree.insert(4);
        tree.validate().unwrap();

        let root = tree.root().unwrap();
        let left = root.left().unwrap();

        assert_eq!(*root.data(), 7);
        assert_eq!(*root.right().unwrap().data(), 8);
        assert_eq!(*left.data(), 4);
        assert_eq!(*left.left().unwrap().data(), 3);
        assert_eq!(*left.right().unwrap().data(), 5);
        assert_eq!(left.left().unwrap().parent(), Some(left));
        assert_eq!(left.right().unwrap().parent(), Some(left));
    }

    #[test]
    fn test_root_rotation_reassigns_root() {
        let mut tree = tree_from(&[1, 2]);
        assert_eq!(*tree.root().unwrap().data(), 1);

        tree.insert(3);
        tree.validate().unwrap();

        let root = tree.root().unwrap();
        assert_eq!(*root.data(), 2);
        assert_eq!(root.parent(), None);
        assert_eq!(*root.left().unwrap().data(), 1);
        assert_eq!(*root.right().unwrap().data(), 3);
    }

    #[test]
    fn test_duplicate_insert() {
        let mut tree = tree_from(&[5, 3, 7]);

        assert!(!tree.insert(3));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.inorder().copied().collect::<Vec<_>>(), vec![3, 5, 7]);
    }

    #[test]
    fn test_removal_leaf_no_rebalance() {
        let mut tree = tree_from(&[7, 5, 8, 3, 13]);

        assert_eq!(tree.remove(&3), Ok(3));
        tree.validate().unwrap();

        let root = tree.root().unwrap();
        let left = root.left().unwrap();

        assert_eq!(*left.data(), 5);
        assert_eq!(left.height(), 0);
        assert_eq!(left.balance_factor(), 0);
        assert_eq!(root.balance_factor(), 1);
        assert!(left.left().is_none());

        assert_eq!(tree.remove(&13), Ok(13));
        assert_eq!(tree.root().unwrap().balance_factor(), 0);
    }

    #[test]
    fn test_removal_left_leaf_with_rebalance() {
        let mut tree = tree_from(&[7, 5, 8, 13]);

        assert_eq!(tree.remove(&5), Ok(5));
        tree.validate().unwrap();

        let root = tree.root().unwrap();

        assert_eq!(*root.data(), 8);
        assert_eq!(*root.left().unwrap().data(), 7);
        assert_eq!(*root.right().unwrap().data(), 13);
        assert_eq!(root.height(), 1);
        assert_eq!(root.balance_factor(), 0);
        assert_eq!(root.left().unwrap().balance_factor(), 0);
        assert_eq!(root.right().unwrap().balance_factor(), 0);
        assert_eq!(root.left().unwrap().parent(), Some(root));
    }

    #[test]
    fn test_removal_right_leaf_with_rebalance() {
        let mut tree = tree_from(&[7, 5, 8, 3]);

        assert_eq!(tree.remove(&8), Ok(8));
        tree.validate().unwrap();

        let root = tree.root().unwrap();

        assert_eq!(*root.data(), 5);
        assert_eq!(*root.left().unwrap().data(), 3);
        assert_eq!(*root.right().unwrap().data(), 7);
        assert_eq!(root.height(), 1);
        assert_eq!(root.balance_factor(), 0);
    }

    #[test]
    fn test_removal_with_balanced_sibling() {
        // once 1 and 3 are gone, 5 has bf +2 and its right child bf 0
        let mut tree = tree_from(&[5, 3, 8, 1, 7, 9]);
        tree.remove(&1).unwrap();
        tree.remove(&3).unwrap();
        tree.validate().unwrap();

        let root = tree.root().unwrap();
        assert_eq!(*root.data(), 8);
        assert_eq!(*root.left().unwrap().data(), 5);
        assert_eq!(*root.left().unwrap().right().unwrap().data(), 7);
        assert_eq!(*root.right().unwrap().data(), 9);
        assert_eq!(root.balance_factor(), -1);
    }

    #[test]
    fn test_removal_single_child() {
        let mut tree = tree_from(&[7, 5, 8, 13]);

        assert_eq!(tree.remove(&8), Ok(8));
        tree.validate().unwrap();

        let root = tree.root().unwrap();
        assert_eq!(*root.right().unwrap().data(), 13);
        assert_eq!(root.right().unwrap().parent(), Some(root));
    }

    #[test]
    fn test_removal_two_children_takes_predecessor() {
        let mut tree = tree_from(&[8, 4, 12, 2, 6, 10, 14, 5]);

        assert_eq!(tree.remove(&8), Ok(8));
        tree.validate().unwrap();

        let root = tree.root().unwrap();
        assert_eq!(*root.data(), 6);
        assert_eq!(*root.left().unwrap().right().unwrap().data(), 5);
        assert_eq!(
            tree.inorder().copied().collect::<Vec<_>>(),
            vec![2, 4, 5, 6, 10, 12, 14]
        );
    }

    #[test]
    fn test_removal_root_until_empty() {
        let mut tree = tree_from(&[2, 1, 3]);

        assert_eq!(tree.remove(&2), Ok(2));
        assert_eq!(tree.remove(&1), Ok(1));
        assert_eq!(*tree.root().unwrap().data(), 3);
        assert_eq!(tree.remove(&3), Ok(3));

        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.remove(&3), Err(TreeError::Empty));
    }

    #[test]
    fn test_removal_missing_value() {
        let mut tree = tree_from(&[2, 1, 3]);

        assert_eq!(tree.remove(&4), Err(TreeError::NotFound));
        assert_eq!(tree.len(), 3);
        tree.validate().unwrap();
    }

    #[test]
    fn test_traversals() {
        let tree = tree_from(&[5, 3, 7, 1, 13]);

        assert_eq!(tree.preorder().copied().collect::<Vec<_>>(), vec![5, 3, 1, 7, 13]);
        assert_eq!(tree.inorder().copied().collect::<Vec<_>>(), vec![1, 3, 5, 7, 13]);
        assert_eq!(tree.postorder().copied().collect::<Vec<_>>(), vec![1, 3, 13, 7, 5]);

        // each call is a fresh traversal
        assert_eq!(tree.inorder().count(), 5);
        assert_eq!(tree.inorder().count(), 5);
    }

    #[test]
    fn test_traversals_empty() {
        let tree = AVLTree::<i32>::new();

        assert_eq!(tree.preorder().next(), None);
        assert_eq!(tree.inorder().next(), None);
        assert_eq!(tree.postorder().next(), None);
        assert_eq!(tree.height(), None);
    }

    #[test]
    fn test_slot_reuse() {
        let mut tree = tree_from(&[1, 2, 3, 4]);
        let slots = tree.nodes.len();

        tree.remove(&2).unwrap();
        tree.remove(&4).unwrap();
        tree.insert(10);
        tree.insert(11);

        assert_eq!(tree.nodes.len(), slots);
        assert_eq!(tree.len(), 4);
        tree.validate().unwrap();
    }

    #[test]
    fn test_lookup() {
        let tree: AVLTree<i32> = [9, 4, 17, 1, 6].into_iter().collect();

        assert!(tree.contains(&6));
        assert!(!tree.contains(&5));
        assert_eq!(tree.get(&17), Some(&17));
        assert_eq!(tree.min(), Some(&1));
        assert_eq!(tree.max(), Some(&17));
        assert_eq!(format!("{:?}", tree), "{1, 4, 6, 9, 17}");
    }

    #[test]
    fn test_large_insert_remove() {
        const COUNT: i32 = 10_000;

        let mut tree = AVLTree::new();

        for i in 0..COUNT {
            tree.insert(i);
        }

        assert_eq!(tree.len(), COUNT as usize);
        // AVL bound: height < 1.44 * log2(n + 2)
        assert!(tree.height().unwrap() <= 19);
        tree.validate().unwrap();

        for i in (0..COUNT).step_by(2) {
            tree.remove(&i).unwrap();
        }

        tree.validate().unwrap();
        assert_eq!(tree.len(), (COUNT / 2) as usize);
        assert!(tree.inorder().copied().eq((1..COUNT).step_by(2)));

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }
}
