//! Structural invariant checking and a debug pretty-printer.
//!
//! Neither of these is on any hot path; they exist for tests and for a
//! caller who suspects something has gone wrong and wants more than "it
//! panicked somewhere".

use crate::error::{BPlusTreeError, TreeResult};
use crate::types::{BPlusTreeMap, NodeId, NodeRef};
use std::fmt::Write as _;

impl<K: Ord + Clone + std::fmt::Debug, V> BPlusTreeMap<K, V> {
    /// Check every invariant this crate depends on: sorted keys, uniform
    /// leaf depth, occupancy bounds, the leftmost-of-right-subtree
    /// separator rule, and a leaf chain that exactly covers every entry in
    /// order with consistent `prev`/`next` links.
    pub fn validate(&self) -> TreeResult<()> {
        let depth = self.check_node(self.root, None, None)?;
        self.check_leaf_chain(depth)?;
        if self.first_leaf_id() != self.leftmost_leaf {
            return Err(BPlusTreeError::corrupted_tree(
                "leftmost_leaf does not match the tree's actual leftmost leaf",
            ));
        }
        let chain_len = self.iter().count();
        if chain_len != self.len {
            return Err(BPlusTreeError::corrupted_tree(format!(
                "size {} does not match {} entries reachable by iteration",
                self.len, chain_len
            )));
        }
        Ok(())
    }

    /// Returns the depth (0 at a leaf) of the subtree rooted at `node`, or
    /// an error describing the first violation found. `lower`/`upper`
    /// bound the keys this subtree is allowed to hold, from the ancestor
    /// separators that led here.
    fn check_node(&self, node: NodeRef, lower: Option<&K>, upper: Option<&K>) -> TreeResult<usize> {
        match node {
            NodeRef::Leaf(id) => {
                let leaf = self
                    .leaf_arena
                    .get(id)
                    .ok_or_else(|| BPlusTreeError::corrupted_tree(format!("dangling leaf id {id}")))?;
                if !leaf.keys.windows(2).all(|w| w[0] < w[1]) {
                    return Err(BPlusTreeError::corrupted_tree(format!(
                        "leaf {id} keys are not strictly increasing"
                    )));
                }
                if let Some(lower) = lower {
                    if leaf.keys.first().is_some_and(|k| k < lower) {
                        return Err(BPlusTreeError::corrupted_tree(format!(
                            "leaf {id} holds a key below its subtree's lower bound"
                        )));
                    }
                }
                if let Some(upper) = upper {
                    if leaf.keys.last().is_some_and(|k| k >= upper) {
                        return Err(BPlusTreeError::corrupted_tree(format!(
                            "leaf {id} holds a key at or above its subtree's upper bound"
                        )));
                    }
                }
                let is_root = matches!(self.root, NodeRef::Leaf(root_id) if root_id == id);
                if !is_root && leaf.is_underfull() {
                    return Err(BPlusTreeError::corrupted_tree(format!(
                        "leaf {id} is underfull: {} keys, minimum {}",
                        leaf.len(),
                        leaf.min_keys()
                    )));
                }
                Ok(0)
            }
            NodeRef::Branch(id) => {
                let branch = self
                    .branch_arena
                    .get(id)
                    .ok_or_else(|| BPlusTreeError::corrupted_tree(format!("dangling branch id {id}")))?;
                if branch.children.len() != branch.keys.len() + 1 {
                    return Err(BPlusTreeError::corrupted_tree(format!(
                        "branch {id} has {} keys but {} children",
                        branch.keys.len(),
                        branch.children.len()
                    )));
                }
                if !branch.keys.windows(2).all(|w| w[0] < w[1]) {
                    return Err(BPlusTreeError::corrupted_tree(format!(
                        "branch {id} separator keys are not strictly increasing"
                    )));
                }
                let is_root = matches!(self.root, NodeRef::Branch(root_id) if root_id == id);
                if !is_root && branch.is_underfull() {
                    return Err(BPlusTreeError::corrupted_tree(format!(
                        "branch {id} is underfull: {} keys, minimum {}",
                        branch.len(),
                        branch.min_keys()
                    )));
                }
                if is_root && branch.is_empty() {
                    return Err(BPlusTreeError::corrupted_tree(
                        "branch root has no separator keys; it should have collapsed",
                    ));
                }

                let children = branch.children.clone();
                let keys = branch.keys.clone();
                let mut child_depth = None;
                for (i, child) in children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(&keys[i - 1]) };
                    let child_upper = if i == keys.len() { upper } else { Some(&keys[i]) };
                    let depth = self.check_node(*child, child_lower, child_upper)?;
                    match child_depth {
                        None => child_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            return Err(BPlusTreeError::corrupted_tree(format!(
                                "branch {id}'s children are not all the same depth"
                            )));
                        }
                        _ => {}
                    }
                    if i > 0 {
                        let separator_matches_leftmost_of_right = self.leftmost_key_of(*child).is_none_or(|k| k == keys[i - 1]);
                        if !separator_matches_leftmost_of_right {
                            return Err(BPlusTreeError::corrupted_tree(format!(
                                "branch {id}'s separator {i} is not the leftmost key of its right subtree"
                            )));
                        }
                    }
                }
                Ok(child_depth.unwrap_or(0) + 1)
            }
        }
    }

    fn leftmost_key_of(&self, node: NodeRef) -> Option<K> {
        match node {
            NodeRef::Leaf(id) => self.leaf_arena.get(id)?.keys.first().cloned(),
            NodeRef::Branch(id) => {
                let branch = self.branch_arena.get(id)?;
                self.leftmost_key_of(branch.get_child(0)?)
            }
        }
    }

    /// Confirm the sibling chain is a cycle-free total order covering
    /// exactly the leaves at `expected_depth`, with consistent `prev`
    /// pointers.
    fn check_leaf_chain(&self, _expected_depth: usize) -> TreeResult<()> {
        let mut id = self.leftmost_leaf;
        let mut prev_id = NodeId::MAX;
        let mut last_key: Option<&K> = None;
        let mut visited = 0usize;
        let total_leaves = self.leaf_arena.len();

        loop {
            let leaf = self
                .leaf_arena
                .get(id)
                .ok_or_else(|| BPlusTreeError::corrupted_tree(format!("dangling leaf {id} in sibling chain")))?;
            if leaf.prev != prev_id {
                return Err(BPlusTreeError::corrupted_tree(format!(
                    "leaf {id}'s prev pointer does not match its actual predecessor"
                )));
            }
            if let (Some(last), Some(first)) = (last_key, leaf.keys.first()) {
                if last >= first {
                    return Err(BPlusTreeError::corrupted_tree(
                        "sibling chain is not strictly increasing across leaf boundaries",
                    ));
                }
            }
            last_key = leaf.keys.last();
            visited += 1;
            if visited > total_leaves {
                return Err(BPlusTreeError::corrupted_tree("sibling chain contains a cycle"));
            }
            if leaf.next == crate::types::NULL_NODE {
                break;
            }
            prev_id = id;
            id = leaf.next;
        }

        if visited != total_leaves {
            return Err(BPlusTreeError::corrupted_tree(format!(
                "sibling chain visits {visited} leaves but the arena holds {total_leaves}"
            )));
        }
        Ok(())
    }

    /// A structural dump for debugging: one indented line per node, in
    /// pre-order, showing each node's id, kind, and keys.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, node: NodeRef, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match node {
            NodeRef::Leaf(id) => {
                if let Some(leaf) = self.leaf_arena.get(id) {
                    let _ = writeln!(
                        out,
                        "{indent}leaf#{id} keys={:?} prev={} next={}",
                        leaf.keys,
                        fmt_node_id(leaf.prev),
                        fmt_node_id(leaf.next)
                    );
                }
            }
            NodeRef::Branch(id) => {
                if let Some(branch) = self.branch_arena.get(id) {
                    let _ = writeln!(out, "{indent}branch#{id} separators={:?}", branch.keys);
                    let children = branch.children.clone();
                    for child in children {
                        self.dump_node(child, depth + 1, out);
                    }
                }
            }
        }
    }
}

fn fmt_node_id(id: NodeId) -> String {
    if id == crate::types::NULL_NODE {
        "-".to_string()
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_passes_on_an_empty_tree() {
        let tree: BPlusTreeMap<i32, i32> = BPlusTreeMap::new(4).unwrap();
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn validate_passes_after_heavy_mixed_workload() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..200 {
            tree.insert(i, i).unwrap();
        }
        for i in (0..200).step_by(2) {
            tree.remove(&i);
        }
        for i in 200..300 {
            tree.insert(i, i).unwrap();
        }
        tree.validate().unwrap();
    }

    #[test]
    fn debug_dump_mentions_every_leaf_key() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..12 {
            tree.insert(i, i).unwrap();
        }
        let dump = tree.debug_dump();
        for i in 0..12 {
            assert!(dump.contains(&i.to_string()), "dump missing key {i}:\n{dump}");
        }
    }
}
