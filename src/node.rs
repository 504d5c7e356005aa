//! Node-local operations: the part of insert/delete that only needs to see
//! one (or two adjacent) nodes, with no arena or tree-wide bookkeeping.

use crate::types::{BranchNode, LeafNode, NodeRef};

/// Outcome of inserting into a leaf. The caller uses this to decide whether
/// the tree's entry count changed — `Replaced` never does, `InsertedNoSplit`
/// and `Split` always do.
pub enum LeafInsert<K, V> {
    /// The key already existed; its old value comes back.
    Replaced(V),
    /// A fresh key was added with no overflow.
    InsertedNoSplit,
    /// A fresh key overflowed the leaf past capacity and it was split. The
    /// new right sibling is returned unlinked and un-allocated; the caller
    /// reserves an arena slot for it and links it into the sibling chain.
    Split {
        new_right: LeafNode<K, V>,
        separator_key: K,
    },
}

impl<K: Ord + Clone, V> LeafNode<K, V> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Floor-based minimum occupancy. Chosen so that a leaf splitting at
    /// exactly `capacity` entries (no transient overflow state) can always
    /// give both halves at least this many: `floor(B/2) + ceil(B/2) == B`
    /// for every `B`, but `2 * ceil(B/2) > B` when `B` is odd, so a ceiling
    /// minimum cannot be honored by both siblings of a post-insert split.
    pub fn min_keys(&self) -> usize {
        self.capacity / 2
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn is_underfull(&self) -> bool {
        self.len() < self.min_keys()
    }

    pub fn can_donate(&self) -> bool {
        self.len() > self.min_keys()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.keys.binary_search(key).ok().map(|i| &self.values[i])
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.keys.binary_search(key) {
            Ok(i) => Some(&mut self.values[i]),
            Err(_) => None,
        }
    }

    fn insert_at(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Insert `key`/`value`, reporting whether the leaf had to split.
    ///
    /// Capacity for the new entry must already be reserved by the caller
    /// (see `BPlusTreeMap::insert`'s `try_reserve` step) — this method never
    /// itself fails.
    pub fn insert(&mut self, key: K, value: V) -> LeafInsert<K, V> {
        match self.keys.binary_search(&key) {
            Ok(index) => {
                let old = std::mem::replace(&mut self.values[index], value);
                LeafInsert::Replaced(old)
            }
            Err(index) => {
                self.insert_at(index, key, value);
                if self.is_full() {
                    let new_right = self.split();
                    let separator_key = new_right.keys[0].clone();
                    LeafInsert::Split { new_right, separator_key }
                } else {
                    LeafInsert::InsertedNoSplit
                }
            }
        }
    }

    /// Split this leaf in half, keeping the lower half and returning the
    /// upper half as a new, still-unlinked leaf. Called only when
    /// `len() == capacity`, so both halves satisfy `min_keys()`.
    fn split(&mut self) -> LeafNode<K, V> {
        let mid = self.len() / 2;
        let right_keys = self.keys.split_off(mid);
        let right_values = self.values.split_off(mid);
        LeafNode {
            capacity: self.capacity,
            keys: right_keys,
            values: right_values,
            prev: crate::types::NULL_NODE,
            next: crate::types::NULL_NODE,
        }
    }

    /// Remove `key`, returning its value and whether the leaf is now
    /// underfull (the caller decides whether underfull matters — the root
    /// leaf is exempt).
    pub fn remove(&mut self, key: &K) -> Option<(V, bool)> {
        let index = self.keys.binary_search(key).ok()?;
        self.keys.remove(index);
        let value = self.values.remove(index);
        Some((value, self.is_underfull()))
    }

    pub fn borrow_last_into(&mut self, right: &mut LeafNode<K, V>) {
        let key = self.keys.pop().expect("donor leaf must be non-empty");
        let value = self.values.pop().expect("donor leaf must be non-empty");
        right.keys.insert(0, key);
        right.values.insert(0, value);
    }

    pub fn borrow_first_into(&mut self, left: &mut LeafNode<K, V>) {
        let key = self.keys.remove(0);
        let value = self.values.remove(0);
        left.keys.push(key);
        left.values.push(value);
    }

    /// Absorb `right`'s entries onto the end of `self` and take over its
    /// `next` link. `right` is left empty for the caller to deallocate.
    pub fn merge_from(&mut self, right: &mut LeafNode<K, V>) {
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        self.next = right.next;
    }
}

impl<K> BranchNode<K> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn min_keys(&self) -> usize {
        self.capacity / 2
    }

    /// Checked *before* inserting — a branch that is already full must have
    /// its new separator/child routed through a pre-allocated split rather
    /// than a plain insert, unlike a leaf.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn is_underfull(&self) -> bool {
        self.len() < self.min_keys()
    }

    pub fn can_donate(&self) -> bool {
        self.len() > self.min_keys()
    }

    pub fn get_child(&self, index: usize) -> Option<NodeRef> {
        self.children.get(index).copied()
    }
}

impl<K: Ord + Clone> BranchNode<K> {
    /// Index of the child that would contain `key`.
    pub fn find_child_index(&self, key: &K) -> usize {
        match self.keys.binary_search(key) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Insert a freshly-split child's separator and right sibling after
    /// `child_index`, assuming the branch was already checked not to be
    /// full (see `is_full`). Splitting a full branch is the caller's job —
    /// this only ever does the plain, non-splitting insert.
    pub fn insert_child(&mut self, child_index: usize, separator_key: K, new_child: NodeRef) {
        self.keys.insert(child_index, separator_key);
        self.children.insert(child_index + 1, new_child);
    }

    /// Split a transiently-overfull branch (one that just received one more
    /// key/child than `capacity` allows) into this node's lower half and a
    /// new upper half, promoting the median key.
    ///
    /// Called with `self.len() == capacity + 1`: the promoted key plus
    /// `floor(B/2)` keys on each side accounts for all `B + 1` transient
    /// keys, so both halves meet `min_keys()` for every `B >= 4` — the
    /// identity that fails if the branch were split from exactly `B` keys
    /// without a transient state.
    pub fn split_overfull(&mut self) -> (BranchNode<K>, K) {
        let mid = self.capacity / 2;
        let promoted_key = self.keys.remove(mid);
        let right_keys = self.keys.split_off(mid);
        let right_children = self.children.split_off(mid + 1);
        let right = BranchNode {
            capacity: self.capacity,
            keys: right_keys,
            children: right_children,
        };
        (right, promoted_key)
    }

    pub fn remove_child(&mut self, child_index: usize) -> NodeRef {
        let separator_index = if child_index == 0 { 0 } else { child_index - 1 };
        self.keys.remove(separator_index);
        self.children.remove(child_index)
    }

    pub fn borrow_last_into(&mut self, right: &mut BranchNode<K>, parent_separator: K) -> K {
        let borrowed_child = self.children.pop().expect("donor branch must be non-empty");
        let new_separator = self.keys.pop().expect("donor branch must be non-empty");
        right.keys.insert(0, parent_separator);
        right.children.insert(0, borrowed_child);
        new_separator
    }

    pub fn borrow_first_into(&mut self, left: &mut BranchNode<K>, parent_separator: K) -> K {
        let borrowed_child = self.children.remove(0);
        let new_separator = self.keys.remove(0);
        left.keys.push(parent_separator);
        left.children.push(borrowed_child);
        new_separator
    }

    /// Absorb `separator` (the parent's key between the two children) and
    /// all of `right`'s keys/children onto the end of `self`.
    pub fn merge_from(&mut self, separator: K, right: &mut BranchNode<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }
}
