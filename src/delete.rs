//! Deletion, including borrow/merge rebalancing and root collapse.
//!
//! Unlike insert, delete never allocates — merges only free nodes and
//! borrows only move entries between existing ones — so there is no
//! allocation-failure mode here; `remove` cannot fail except by the key
//! being absent, which is reported as `None`, not an error.

use crate::search::PathStep;
use crate::types::{BPlusTreeMap, NodeId, NodeRef};

fn leaf_child_id(child: NodeRef) -> NodeId {
    match child {
        NodeRef::Leaf(id) => id,
        NodeRef::Branch(_) => unreachable!("a leaf's sibling in the same parent must be a leaf"),
    }
}

fn branch_child_id(child: NodeRef) -> NodeId {
    match child {
        NodeRef::Branch(id) => id,
        NodeRef::Leaf(_) => unreachable!("a branch's sibling in the same parent must be a branch"),
    }
}

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Remove `key`, returning its value, or `None` if it was not present.
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(4).unwrap();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.remove(&1), Some("one"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (leaf_id, path) = self.locate(key);
        let leaf = self.leaf_arena.get_mut(leaf_id)?;
        let removed_was_minimum = leaf.keys.first() == Some(key);
        let (value, is_underfull) = leaf.remove(key)?;

        self.len -= 1;
        self.epoch = self.epoch.wrapping_add(1);

        if removed_was_minimum {
            if let Some(new_min) = self.leaf_arena.get(leaf_id).unwrap().keys.first().cloned() {
                self.fix_separator_after_min_removed(&path, leaf_id, new_min);
            }
        }

        let is_only_node = path.is_empty();
        if is_underfull && !is_only_node {
            self.rebalance_leaf(leaf_id, path);
        }

        Some(value)
    }

    /// After deleting a leaf's first key, any ancestor separator that used
    /// this leaf as "the right side" of its split is now stale and must be
    /// rewritten to the leaf's new minimum. This can only be the case at an
    /// ancestor where this leaf was NOT reached via child 0 (a leftmost
    /// child's separator, if any, belongs to a different, higher subtree).
    fn fix_separator_after_min_removed(&mut self, path: &[PathStep], _leaf_id: NodeId, new_min: K) {
        for &(branch_id, child_index) in path.iter().rev() {
            if child_index == 0 {
                continue;
            }
            let branch = self.branch_arena.get_mut(branch_id).unwrap();
            branch.keys[child_index - 1] = new_min;
            return;
        }
    }

    /// Restore leaf occupancy by borrowing from a sibling, or merging with
    /// one, then propagate any resulting branch underflow up the path.
    fn rebalance_leaf(&mut self, leaf_id: NodeId, path: Vec<PathStep>) {
        let &(parent_id, child_index) = path.last().unwrap();
        let parent = self.branch_arena.get(parent_id).unwrap();
        let left_id = (child_index > 0).then(|| leaf_child_id(parent.get_child(child_index - 1).unwrap()));
        let right_id = (child_index + 1 < parent.children.len())
            .then(|| leaf_child_id(parent.get_child(child_index + 1).unwrap()));

        if let Some(left_id) = left_id {
            if self.leaf_arena.get(left_id).unwrap().can_donate() {
                let (left, right) = self.leaf_arena.get_pair_mut(left_id, leaf_id).unwrap();
                left.borrow_last_into(right);
                let new_sep = right.keys[0].clone();
                self.branch_arena.get_mut(parent_id).unwrap().keys[child_index - 1] = new_sep;
                return;
            }
        }

        if let Some(right_id) = right_id {
            if self.leaf_arena.get(right_id).unwrap().can_donate() {
                let (left, right) = self.leaf_arena.get_pair_mut(leaf_id, right_id).unwrap();
                right.borrow_first_into(left);
                let new_sep = right.keys[0].clone();
                self.branch_arena.get_mut(parent_id).unwrap().keys[child_index] = new_sep;
                return;
            }
        }

        // Neither sibling can donate: merge. Prefer the left sibling when
        // one exists, matching the parent-slot bookkeeping `remove_child`
        // expects (it always removes the *right* child of the pair and the
        // separator immediately to its left).
        if let Some(left_id) = left_id {
            self.merge_leaves(left_id, leaf_id, parent_id, child_index);
        } else if let Some(right_id) = right_id {
            self.merge_leaves(leaf_id, right_id, parent_id, child_index + 1);
        }

        self.propagate_branch_underflow(path);
    }

    /// Merge `right_id` into `left_id`, unlink `right_id` from the sibling
    /// chain, free it, and remove its slot (`child_index`) from the parent.
    fn merge_leaves(
        &mut self,
        left_id: NodeId,
        right_id: NodeId,
        parent_id: NodeId,
        child_index: usize,
    ) {
        {
            let (left, right) = self.leaf_arena.get_pair_mut(left_id, right_id).unwrap();
            left.merge_from(right);
        }
        let new_next = self.leaf_arena.get(left_id).unwrap().next;
        if new_next != crate::types::NULL_NODE {
            self.leaf_arena.get_mut(new_next).unwrap().prev = left_id;
        }
        self.leaf_arena.deallocate(right_id);
        self.branch_arena.get_mut(parent_id).unwrap().remove_child(child_index);
        if self.leftmost_leaf == right_id {
            self.leftmost_leaf = left_id;
        }
    }

    /// After a leaf merge removes one of the parent's children, the parent
    /// itself may now be underfull; walk upward fixing that the same way,
    /// finally collapsing the root if it has been reduced to one child.
    fn propagate_branch_underflow(&mut self, mut path: Vec<PathStep>) {
        loop {
            let Some((branch_id, _)) = path.pop() else {
                return;
            };
            let is_root = path.is_empty();
            let branch = self.branch_arena.get(branch_id).unwrap();

            if is_root {
                if branch.is_empty() {
                    self.root = branch.get_child(0).unwrap();
                    self.branch_arena.deallocate(branch_id);
                }
                return;
            }

            if !branch.is_underfull() {
                return;
            }

            let &(parent_id, child_index) = path.last().unwrap();
            let parent = self.branch_arena.get(parent_id).unwrap();
            let left_id = (child_index > 0)
                .then(|| branch_child_id(parent.get_child(child_index - 1).unwrap()));
            let right_id = (child_index + 1 < parent.children.len())
                .then(|| branch_child_id(parent.get_child(child_index + 1).unwrap()));

            if let Some(left_id) = left_id {
                if self.branch_arena.get(left_id).unwrap().can_donate() {
                    let separator = self.branch_arena.get(parent_id).unwrap().keys[child_index - 1].clone();
                    let (left, right) = self.branch_arena.get_pair_mut(left_id, branch_id).unwrap();
                    let new_sep = left.borrow_last_into(right, separator);
                    self.branch_arena.get_mut(parent_id).unwrap().keys[child_index - 1] = new_sep;
                    return;
                }
            }

            if let Some(right_id) = right_id {
                if self.branch_arena.get(right_id).unwrap().can_donate() {
                    let separator = self.branch_arena.get(parent_id).unwrap().keys[child_index].clone();
                    let (left, right) = self.branch_arena.get_pair_mut(branch_id, right_id).unwrap();
                    let new_sep = right.borrow_first_into(left, separator);
                    self.branch_arena.get_mut(parent_id).unwrap().keys[child_index] = new_sep;
                    return;
                }
            }

            if let Some(left_id) = left_id {
                let separator = self.branch_arena.get(parent_id).unwrap().keys[child_index - 1].clone();
                let mut right_node = self.branch_arena.deallocate(branch_id).unwrap();
                self.branch_arena.get_mut(left_id).unwrap().merge_from(separator, &mut right_node);
                self.branch_arena.get_mut(parent_id).unwrap().remove_child(child_index);
            } else if let Some(right_id) = right_id {
                let separator = self.branch_arena.get(parent_id).unwrap().keys[child_index].clone();
                let mut right_node = self.branch_arena.deallocate(right_id).unwrap();
                self.branch_arena.get_mut(branch_id).unwrap().merge_from(separator, &mut right_node);
                self.branch_arena.get_mut(parent_id).unwrap().remove_child(child_index + 1);
            }
            // loop back around: the parent may now itself be underfull.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_absent_key_returns_none() {
        let mut tree: BPlusTreeMap<i32, i32> = BPlusTreeMap::new(4).unwrap();
        assert_eq!(tree.remove(&1), None);
    }

    #[test]
    fn insert_then_remove_single_entry_returns_to_empty() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        tree.insert(1, "one").unwrap();
        assert_eq!(tree.remove(&1), Some("one"));
        assert!(tree.is_empty());
        assert_eq!(tree.get(&1), None);
    }

    #[test]
    fn remove_every_third_key_leaves_a_valid_sorted_tree() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 1..=20 {
            tree.insert(i, i).unwrap();
        }
        for i in (3..=18).step_by(3) {
            assert_eq!(tree.remove(&i), Some(i));
        }
        assert_eq!(tree.len(), 14);
        tree.validate().unwrap();
        let remaining: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        let expected: Vec<_> = (1..=20).filter(|i| i % 3 != 0 || *i > 18).collect();
        assert_eq!(remaining, expected);
    }

    #[test]
    fn removing_down_to_a_handful_collapses_the_root() {
        let mut tree = BPlusTreeMap::new(5).unwrap();
        for i in 1..=100 {
            tree.insert(i, i).unwrap();
        }
        for i in 1..=95 {
            tree.remove(&i);
        }
        assert_eq!(tree.len(), 5);
        tree.validate().unwrap();
        let remaining: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(remaining, vec![96, 97, 98, 99, 100]);
        assert_eq!(tree.first_key_value(), Some((&96, &96)));
    }

    #[test]
    fn removing_the_whole_first_leaf_updates_leftmost_leaf() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 1..=16 {
            tree.insert(i, i).unwrap();
        }
        for i in 1..=4 {
            tree.remove(&i);
        }
        tree.validate().unwrap();
        assert_eq!(tree.first_key_value(), Some((&5, &5)));
        let collected: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(collected, (5..=16).collect::<Vec<_>>());
    }

    #[test]
    fn split_then_partial_removal_keeps_a_valid_leaf_chain() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for k in [10, 20, 30, 40, 50] {
            tree.insert(k, k).unwrap();
        }
        tree.remove(&20);
        tree.remove(&40);
        tree.validate().unwrap();
        let collected: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(collected, vec![10, 30, 50]);
    }
}
