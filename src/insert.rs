//! Insertion, including split propagation and root growth.
//!
//! Every split reserves the arena slot for its new sibling *before*
//! mutating any key or value, so the first allocation failure in a cascade
//! is always caught before that level's data moves. A failure partway up a
//! multi-level cascade leaves every level that already completed its split
//! in a fully valid, invariant-satisfying state (just a tree that grew one
//! level less than the caller asked for) rather than attempting a single
//! whole-operation transaction across arena boundaries.

use crate::error::TreeResult;
use crate::node::LeafInsert;
use crate::search::PathStep;
use crate::types::{BPlusTreeMap, BranchNode, NodeId, NodeRef};

fn try_reserve_one<T>(v: &mut Vec<T>) -> TreeResult<()> {
    v.try_reserve(1)
        .map_err(|e| crate::error::BPlusTreeError::allocation_failed(e.to_string()))
}

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Insert `key`/`value`. Returns the previous value if `key` was
    /// already present (size is unchanged), or `None` if it's new (size
    /// grows by one).
    pub fn insert(&mut self, key: K, value: V) -> TreeResult<Option<V>> {
        let (leaf_id, path) = self.locate(&key);

        let leaf = self
            .leaf_arena
            .get_mut(leaf_id)
            .expect("located leaf must exist");
        let is_new_key = leaf.get(&key).is_none();
        if is_new_key {
            try_reserve_one(&mut leaf.keys)?;
            try_reserve_one(&mut leaf.values)?;
        }

        let leaf = self.leaf_arena.get_mut(leaf_id).unwrap();
        match leaf.insert(key, value) {
            LeafInsert::Replaced(old) => Ok(Some(old)),
            LeafInsert::InsertedNoSplit => {
                self.len += 1;
                self.epoch = self.epoch.wrapping_add(1);
                Ok(None)
            }
            LeafInsert::Split { new_right, separator_key } => {
                let new_leaf_id = self.leaf_arena.try_allocate(new_right)?;
                self.link_leaf_after(leaf_id, new_leaf_id);
                self.propagate_split(path, NodeRef::Leaf(new_leaf_id), separator_key)?;
                self.len += 1;
                self.epoch = self.epoch.wrapping_add(1);
                Ok(None)
            }
        }
    }

    /// Splice `new_id` into the sibling chain immediately after `left_id`.
    fn link_leaf_after(&mut self, left_id: crate::types::NodeId, new_id: crate::types::NodeId) {
        let old_next = {
            let left = self.leaf_arena.get_mut(left_id).unwrap();
            let old_next = left.next;
            left.next = new_id;
            old_next
        };
        {
            let new_leaf = self.leaf_arena.get_mut(new_id).unwrap();
            new_leaf.prev = left_id;
            new_leaf.next = old_next;
        }
        if old_next != crate::types::NULL_NODE {
            self.leaf_arena.get_mut(old_next).unwrap().prev = new_id;
        }
    }

    /// Walk the recorded descent path upward, inserting the promoted
    /// separator/child at each level and splitting again if that overflows
    /// the branch. If the path is exhausted (the root itself split), grow
    /// the tree by one level.
    fn propagate_split(
        &mut self,
        path: Vec<PathStep>,
        mut new_child: NodeRef,
        mut separator_key: K,
    ) -> TreeResult<()> {
        for (branch_id, child_index) in path.into_iter().rev() {
            let branch = self.branch_arena.get(branch_id).unwrap();
            if !branch.is_full() {
                let branch = self.branch_arena.get_mut(branch_id).unwrap();
                branch.insert_child(child_index, separator_key, new_child);
                return Ok(());
            }

            let (new_branch_id, promoted_key) =
                self.split_full_branch(branch_id, child_index, separator_key, new_child)?;
            new_child = NodeRef::Branch(new_branch_id);
            separator_key = promoted_key;
        }

        // Path exhausted: the old root just split. Grow the tree.
        let mut new_root = BranchNode::new(self.capacity);
        new_root.keys.push(separator_key);
        new_root.children.push(self.root);
        new_root.children.push(new_child);
        let new_root_id = self.branch_arena.try_allocate(new_root)?;
        self.root = NodeRef::Branch(new_root_id);
        Ok(())
    }

    /// Pre-allocate the right sibling before touching `branch_id`'s keys,
    /// so an allocation failure here never loses the child being inserted.
    fn split_full_branch(
        &mut self,
        branch_id: NodeId,
        child_index: usize,
        separator_key: K,
        new_child: NodeRef,
    ) -> TreeResult<(NodeId, K)> {
        let placeholder_id = self.branch_arena.try_allocate(BranchNode::new(self.capacity))?;
        let branch = self.branch_arena.get_mut(branch_id).unwrap();
        branch.insert_child(child_index, separator_key, new_child);
        let (new_right, promoted_key) = branch.split_overfull();
        *self.branch_arena.get_mut(placeholder_id).unwrap() = new_right;
        Ok((placeholder_id, promoted_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_splitting_inserts_still_grow_len_and_bump_epoch() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        let epoch_before = tree.epoch;
        tree.insert(1, 1).unwrap();
        tree.insert(2, 2).unwrap();
        tree.insert(3, 3).unwrap();
        assert_eq!(tree.len(), 3);
        assert_ne!(tree.epoch, epoch_before);
        assert_eq!(tree.remove(&1), Some(1));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn insert_ascending_builds_a_branch_root_at_capacity_four() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 1..=10 {
            assert_eq!(tree.insert(i, i * 10).unwrap(), None);
        }
        assert_eq!(tree.len(), 10);
        assert!(matches!(tree.root, NodeRef::Branch(_)));
        let collected: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(collected, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn insert_out_of_order_still_sorts() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in [15, 3, 8, 12, 1, 20, 7, 18, 5, 10] {
            tree.insert(i, i).unwrap();
        }
        let collected: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(collected, vec![1, 3, 5, 7, 8, 10, 12, 15, 18, 20]);
    }

    #[test]
    fn duplicate_insert_updates_value_and_leaves_size_unchanged() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        tree.insert(1, "first").unwrap();
        assert_eq!(tree.len(), 1);
        let old = tree.insert(1, "second").unwrap();
        assert_eq!(old, Some("first"));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1), Some(&"second"));
    }

    #[test]
    fn insert_with_odd_capacity_maintains_invariants() {
        let mut tree = BPlusTreeMap::new(5).unwrap();
        for i in 0..100 {
            tree.insert(i, i).unwrap();
        }
        tree.validate().unwrap();
        assert_eq!(tree.len(), 100);
    }

    #[test]
    fn leaf_chain_stays_linked_across_many_splits() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..64 {
            tree.insert(i, i).unwrap();
        }
        tree.validate().unwrap();
        let forward: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        let mut backward: Vec<_> = tree.iter_rev().map(|(k, _)| *k).collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }
}
