use log::{debug, trace};
use std::cmp::{max, min};

use crate::error::{HeapError, InvariantViolation};
use crate::pod::OptionalU32;

/// Capacity settings of an [`IndexedDHeap`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeapConfig {
    /// Number of children per node.
    pub degree: usize,
    /// Number of key indices, i.e. key indices live in `[0, max_size)`.
    pub max_size: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            degree: 2,
            max_size: 16,
        }
    }
}

impl HeapConfig {
    /// Applies the lower bounds on degree and capacity: a degree of at least 2
    /// and room for at least one full level below the root.
    pub fn normalized(self) -> Self {
        let degree = max(self.degree, 2);

        Self {
            degree,
            max_size: max(degree + 1, self.max_size),
        }
    }
}

/// Indexed min-heap over a complete D-ary tree.
///
/// Entries are addressed by a caller-assigned key index (`ki`) in
/// `[0, max_size)`, while the tree works on node indices (`ni`) in `[0, len)`.
/// Two maps link them:
///
/// * the position map `pm[ki] = ni`;
/// * the inverse map `im[ni] = ki`.
///
/// Values are stored by key index, so moving a node only touches the maps.
#[derive(Clone, Debug)]
pub struct IndexedDHeap<V: Ord> {
    /// Number of children per node.
    degree: usize,

    /// Number of key indices.
    max_size: usize,

    /// Number of entries in the heap.
    size: usize,

    /// Position map.
    pm: Vec<OptionalU32>,

    /// Inverse map.
    im: Vec<OptionalU32>,

    /// Values indexed by key index.
    values: Vec<Option<V>>,
}

impl<V: Ord> IndexedDHeap<V> {
    /// Creates an empty heap.
    ///
    /// The degree is raised to at least 2 and `max_size` to at least
    /// `degree + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `max_size` does not fit in a `u32` index.
    pub fn new(degree: usize, max_size: usize) -> Self {
        Self::with_config(HeapConfig { degree, max_size })
    }

    /// Creates an empty heap from a [`HeapConfig`].
    pub fn with_config(config: HeapConfig) -> Self {
        let HeapConfig { degree, max_size } = config.normalized();

        assert!(
            max_size < u32::MAX as usize,
            "max size {max_size} does not fit the index maps"
        );

        Self {
            degree,
            max_size,
            size: 0,
            pm: vec![OptionalU32::none(); max_size],
            im: vec![OptionalU32::none(); max_size],
            values: (0..max_size).map(|_| None).collect(),
        }
    }

    /// Returns the number of children per node.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the number of key indices the heap accepts.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the number of entries in the heap.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Indicates whether the heap is empty or not.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Removes every entry from the heap.
    pub fn clear(&mut self) {
        self.pm.fill(OptionalU32::none());
        self.im.fill(OptionalU32::none());
        self.values.iter_mut().for_each(|value| *value = None);
        self.size = 0;
    }

    /// Checks whether a key index is present in the heap or not.
    pub fn contains(&self, ki: usize) -> Result<bool, HeapError> {
        self.check_bounds(ki)?;
        Ok(self.values[ki].is_some())
    }

    /// Returns the value stored under a key index, if there is one.
    pub fn value_of(&self, ki: usize) -> Result<Option<&V>, HeapError> {
        self.check_bounds(ki)?;
        Ok(self.values[ki].as_ref())
    }

    /// Returns the node index currently holding `ki`.
    pub fn position_of(&self, ki: usize) -> Option<usize> {
        self.pm.get(ki)?.get()
    }

    /// Returns the key index held by node `ni`.
    pub fn key_index_at(&self, ni: usize) -> Option<usize> {
        self.im.get(ni)?.get()
    }

    /// Returns the value held by node `ni`.
    pub fn node_value(&self, ni: usize) -> Option<&V> {
        self.values[self.key_index_at(ni)?].as_ref()
    }

    /// Inserts a value under a key index that is not in the heap.
    ///
    /// # Arguments
    ///
    /// * `ki` - key index of the entry.
    /// * `value` - the value of the entry.
    pub fn insert(&mut self, ki: usize, value: V) -> Result<(), HeapError> {
        if self.contains(ki)? {
            debug!("key index {ki} already in heap");
            return Err(HeapError::KeyIndexOccupied(ki));
        }

        let ni = self.size;

        self.pm[ki] = OptionalU32::from_index(ni);
        self.im[ni] = OptionalU32::from_index(ki);
        self.values[ki] = Some(value);
        self.size += 1;

        self.swim(ni);

        Ok(())
    }

    /// Removes a key index from the heap, returning it along with its value.
    ///
    /// The entry is swapped with the last node, the last node is cleared and
    /// the entry moved into the vacated position is swum and sunk back into
    /// place.
    pub fn delete(&mut self, ki: usize) -> Result<(usize, V), HeapError> {
        let ni = self.occupied_position(ki)?;
        let last = self.size - 1;

        if ni != last {
            self.swap(ni, last);
        }

        let value = self.clear_node(ki)?;

        if ni != last {
            let ni = self.swim(ni);
            self.sink(ni);
        }

        Ok((ki, value))
    }

    /// Sets the value of a key index, inserting it if it is not in the heap.
    ///
    /// Returns the previous value, if any.
    pub fn update(&mut self, ki: usize, value: V) -> Result<Option<V>, HeapError> {
        self.check_bounds(ki)?;

        match self.position_of(ki) {
            None => self.insert(ki, value).map(|_| None),
            Some(ni) => {
                let previous = self.values[ki].replace(value);
                let ni = self.swim(ni);
                self.sink(ni);

                Ok(previous)
            }
        }
    }

    /// Lowers the value of a key index.
    ///
    /// Returns `Ok(false)` and leaves the heap untouched if `value` is not
    /// strictly smaller than the current one.
    pub fn decrease_key(&mut self, ki: usize, value: V) -> Result<bool, HeapError> {
        let ni = self.occupied_position(ki)?;

        if self.values[ki].as_ref().is_some_and(|current| value < *current) {
            self.values[ki] = Some(value);
            self.swim(ni);
            return Ok(true);
        }

        Ok(false)
    }

    /// Raises the value of a key index.
    ///
    /// Returns `Ok(false)` and leaves the heap untouched if `value` is not
    /// strictly larger than the current one.
    pub fn increase_key(&mut self, ki: usize, value: V) -> Result<bool, HeapError> {
        let ni = self.occupied_position(ki)?;

        if self.values[ki].as_ref().is_some_and(|current| value > *current) {
            self.values[ki] = Some(value);
            self.sink(ni);
            return Ok(true);
        }

        Ok(false)
    }

    /// Returns the key index and value at the top of the heap.
    pub fn peek_min(&self) -> Option<(usize, &V)> {
        let ki = self.key_index_at(0)?;
        self.values[ki].as_ref().map(|value| (ki, value))
    }

    /// Returns the key index of the smallest value.
    pub fn peek_min_key_index(&self) -> Option<usize> {
        self.peek_min().map(|(ki, _)| ki)
    }

    /// Returns the smallest value.
    pub fn peek_min_value(&self) -> Option<&V> {
        self.peek_min().map(|(_, value)| value)
    }

    /// Removes the top of the heap, returning its key index and value.
    pub fn poll_min(&mut self) -> Option<(usize, V)> {
        self.try_poll_min().ok()
    }

    /// Same as [`IndexedDHeap::poll_min`], reporting an empty heap as an error.
    pub fn try_poll_min(&mut self) -> Result<(usize, V), HeapError> {
        match self.peek_min_key_index() {
            Some(ki) => self.delete(ki),
            None => {
                debug!("heap is empty, nothing to poll");
                Err(HeapError::Empty)
            }
        }
    }

    /// Removes the top of the heap, returning its key index.
    pub fn poll_min_key_index(&mut self) -> Option<usize> {
        self.poll_min().map(|(ki, _)| ki)
    }

    /// Removes the top of the heap, returning its value.
    pub fn poll_min_value(&mut self) -> Option<V> {
        self.poll_min().map(|(_, value)| value)
    }

    /// Iterates over `(ki, value)` pairs in node index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &V)> + '_ {
        (0..self.size).filter_map(move |ni| {
            let ki = self.key_index_at(ni)?;
            self.values[ki].as_ref().map(|value| (ki, value))
        })
    }

    /// Checks the position map and inverse map against each other, the heap
    /// order of every node and that values exist exactly for live key indices.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for ni in 0..self.max_size {
            match (ni < self.size, self.key_index_at(ni)) {
                (true, Some(ki)) => {
                    if self.position_of(ki) != Some(ni) {
                        return Err(InvariantViolation::PositionMap { ki });
                    }

                    if ni > 0 && self.less(ni, self.parent(ni)) {
                        return Err(InvariantViolation::HeapOrder { ni });
                    }
                }
                (false, None) => {}
                (_, ki) => {
                    return Err(InvariantViolation::PositionMap {
                        ki: ki.unwrap_or(self.max_size),
                    })
                }
            }
        }

        for ki in 0..self.max_size {
            match (self.position_of(ki), self.values[ki].is_some()) {
                (Some(ni), true) => {
                    if self.key_index_at(ni) != Some(ki) {
                        return Err(InvariantViolation::PositionMap { ki });
                    }
                }
                (None, false) => {}
                _ => return Err(InvariantViolation::ValuePresence { ki }),
            }
        }

        Ok(())
    }

    /// Returns the node index of the smallest child of `parent_ni`, or `None`
    /// when the node has no children.
    pub(crate) fn smallest_child(&self, parent_ni: usize) -> Option<usize> {
        let first = self.degree.checked_mul(parent_ni)?.checked_add(1)?;
        let end = min(first.saturating_add(self.degree), self.size);

        (first..end)
            .filter_map(|ni| self.node_value(ni).map(|value| (ni, value)))
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(ni, _)| ni)
    }

    /// Moves node `ni` up while it is smaller than its parent, returning its
    /// final position.
    fn swim(&mut self, mut ni: usize) -> usize {
        while ni > 0 {
            let parent = self.parent(ni);

            if !self.less(ni, parent) {
                break;
            }

            self.swap(ni, parent);
            ni = parent;
        }

        ni
    }

    /// Moves node `ni` down while its smallest child is smaller, returning its
    /// final position.
    fn sink(&mut self, mut ni: usize) -> usize {
        while let Some(child) = self.smallest_child(ni) {
            if !self.less(child, ni) {
                break;
            }

            self.swap(ni, child);
            ni = child;
        }

        ni
    }

    fn swap(&mut self, ni1: usize, ni2: usize) {
        if let (Some(ki1), Some(ki2)) = (self.key_index_at(ni1), self.key_index_at(ni2)) {
            trace!("swapping node {ni1} (key index {ki1}) with node {ni2} (key index {ki2})");

            self.pm.swap(ki1, ki2);
            self.im.swap(ni1, ni2);
        }
    }

    /// Clears the node of a key index, which must hold the last position.
    fn clear_node(&mut self, ki: usize) -> Result<V, HeapError> {
        let ni = self.pm[ki].take().ok_or(HeapError::KeyIndexNotFound(ki))?;

        self.im[ni as usize].take();
        self.size -= 1;

        self.values[ki].take().ok_or(HeapError::KeyIndexNotFound(ki))
    }

    #[inline]
    fn parent(&self, ni: usize) -> usize {
        (ni - 1) / self.degree
    }

    #[inline]
    fn less(&self, ni1: usize, ni2: usize) -> bool {
        match (self.node_value(ni1), self.node_value(ni2)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    fn occupied_position(&self, ki: usize) -> Result<usize, HeapError> {
        self.check_bounds(ki)?;

        self.position_of(ki).ok_or_else(|| {
            debug!("key index {ki} not in heap");
            HeapError::KeyIndexNotFound(ki)
        })
    }

    #[inline]
    fn check_bounds(&self, ki: usize) -> Result<(), HeapError> {
        if ki < self.max_size {
            Ok(())
        } else {
            debug!("key index {ki} out of bounds (max size {})", self.max_size);
            Err(HeapError::KeyIndexOutOfBounds {
                ki,
                max_size: self.max_size,
            })
        }
    }
}

impl<V: Ord> Default for IndexedDHeap<V> {
    fn default() -> Self {
        Self::with_config(HeapConfig::default())
    }
}
