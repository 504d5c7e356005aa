//! Root-to-leaf descent, shared by every operation that needs to find a key
//! and, for mutations, remember how it got there.

use crate::types::{BPlusTreeMap, NodeId, NodeRef};

/// One step of a descent: the branch visited and the index of the child
/// chosen. Root-first, leaf-parent-last.
pub type PathStep = (NodeId, usize);

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Descend from the root to the leaf that contains (or would contain)
    /// `key`, recording the branch path taken.
    pub(crate) fn locate(&self, key: &K) -> (NodeId, Vec<PathStep>) {
        let mut path = Vec::new();
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id) => return (id, path),
                NodeRef::Branch(id) => {
                    let branch = self
                        .branch_arena
                        .get(id)
                        .expect("branch referenced from the tree must be allocated");
                    let child_index = branch.find_child_index(key);
                    path.push((id, child_index));
                    current = branch
                        .get_child(child_index)
                        .expect("find_child_index must return a valid slot");
                }
            }
        }
    }

    /// The id of the leftmost leaf, found by always descending child 0.
    /// Used to cross-check `self.leftmost_leaf` in `validate`.
    pub(crate) fn first_leaf_id(&self) -> NodeId {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id) => return id,
                NodeRef::Branch(id) => {
                    let branch = self.branch_arena.get(id).expect("branch must exist");
                    current = branch.get_child(0).expect("branch must have a child 0");
                }
            }
        }
    }
}
