//! Building and resetting a tree.

use crate::error::{BPlusTreeError, TreeResult};
use crate::types::{BPlusTreeMap, LeafNode, NodeRef, MIN_CAPACITY};

impl<K, V> BPlusTreeMap<K, V> {
    /// Create an empty tree with the given branching factor.
    ///
    /// `capacity` bounds both the number of entries a leaf may hold and the
    /// number of separator keys a branch may hold; it must be at least
    /// [`MIN_CAPACITY`].
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let tree: BPlusTreeMap<i32, &str> = BPlusTreeMap::new(16).unwrap();
    /// assert!(tree.is_empty());
    ///
    /// assert!(BPlusTreeMap::<i32, &str>::new(2).is_err());
    /// ```
    pub fn new(capacity: usize) -> TreeResult<Self> {
        validation::validate_capacity(capacity)?;
        Ok(BPlusTreeMap {
            capacity,
            root: NodeRef::Leaf(0),
            leaf_arena: {
                let mut arena = crate::arena::Arena::new();
                arena
                    .try_allocate(LeafNode::new(capacity))
                    .expect("first allocation into an empty arena cannot fail");
                arena
            },
            branch_arena: crate::arena::Arena::new(),
            len: 0,
            leftmost_leaf: 0,
            epoch: 0,
        })
    }

    /// Create an empty tree with a reasonable default branching factor.
    pub fn with_default_capacity() -> Self {
        Self::new(32).expect("default capacity is always valid")
    }

    /// Remove every entry, freeing all nodes but the tree itself.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.branch_arena.clear();
        let root_id = self
            .leaf_arena
            .try_allocate(LeafNode::new(self.capacity))
            .expect("allocating into a freshly cleared arena cannot fail");
        self.root = NodeRef::Leaf(root_id);
        self.leftmost_leaf = root_id;
        self.len = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

impl<K: Ord + Clone, V: Clone> Default for BPlusTreeMap<K, V> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Standalone capacity validation, usable before committing to building a
/// tree (e.g. when capacity is derived from user input).
pub mod validation {
    use super::*;

    pub fn validate_capacity(capacity: usize) -> Result<(), BPlusTreeError> {
        if capacity < MIN_CAPACITY {
            return Err(BPlusTreeError::invalid_capacity(format!(
                "capacity {capacity} is below the minimum of {MIN_CAPACITY}"
            )));
        }
        Ok(())
    }

    /// A capacity that comfortably amortizes arena growth for a tree
    /// expected to hold roughly `expected_entries` entries.
    pub fn recommended_capacity(expected_entries: usize) -> usize {
        match expected_entries {
            0..=64 => 8,
            65..=4_096 => 32,
            4_097..=1_048_576 => 64,
            _ => 128,
        }
    }
}
