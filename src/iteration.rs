//! Forward/reverse traversal of the leaf chain, and range queries over it.
//!
//! `Iter`/`IterRev`/`Range` all borrow the tree, so the borrow checker
//! statically rules out the class of bug the invalidation contract exists
//! to catch: you cannot call `insert`/`remove`/`clear` while one of these
//! is alive. [`Cursor`] is for the one case that doesn't hold a borrow — a
//! position remembered across calls — and checks the tree's mutation
//! epoch at each use instead.

use crate::types::{BPlusTreeMap, LeafNode, NodeId, NULL_NODE};
use std::ops::{Bound, RangeBounds};

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            leaf: self.leaf_arena.get(self.leftmost_leaf),
            index: 0,
        }
    }

    pub fn iter_rev(&self) -> IterRev<'_, K, V> {
        let leaf_id = self.rightmost_leaf_id();
        IterRev {
            tree: self,
            leaf: leaf_id.and_then(|id| self.leaf_arena.get(id)),
            index: leaf_id.map(|id| self.leaf_arena.get(id).unwrap().len()).unwrap_or(0),
        }
    }

    /// An iterator over the entries whose keys fall in `range`, in
    /// ascending order.
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(4).unwrap();
    /// for i in 0..10 {
    ///     tree.insert(i, i * i);
    /// }
    /// let squares: Vec<_> = tree.range(3..7).map(|(k, v)| (*k, *v)).collect();
    /// assert_eq!(squares, vec![(3, 9), (4, 16), (5, 25), (6, 36)]);
    /// assert_eq!(tree.range(8..).count(), 2);
    /// assert_eq!(tree.range(..2).count(), 2);
    /// ```
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> Range<'_, K, V> {
        let start_key = match range.start_bound() {
            Bound::Included(k) | Bound::Excluded(k) => Some(k),
            Bound::Unbounded => None,
        };
        let skip_first = matches!(range.start_bound(), Bound::Excluded(_));
        let start_excluded_key = if skip_first { start_key.cloned() } else { None };

        let (leaf, index) = match start_key {
            Some(key) => {
                let (leaf_id, _) = self.locate(key);
                let leaf = self.leaf_arena.get(leaf_id).unwrap();
                let index = match leaf.keys.binary_search(key) {
                    Ok(i) => i,
                    Err(i) => i,
                };
                (Some(leaf), index)
            }
            None => (self.leaf_arena.get(self.leftmost_leaf), 0),
        };

        let end_bound = match range.end_bound() {
            Bound::Included(k) => Some((k.clone(), true)),
            Bound::Excluded(k) => Some((k.clone(), false)),
            Bound::Unbounded => None,
        };

        Range {
            inner: Iter { tree: self, leaf, index },
            end_bound,
            skip_first,
            start_excluded_key,
            started: false,
        }
    }

    fn rightmost_leaf_id(&self) -> Option<NodeId> {
        let mut id = self.leftmost_leaf;
        loop {
            match self.leaf_arena.get(id) {
                Some(leaf) if leaf.next != NULL_NODE => id = leaf.next,
                Some(_) => return Some(id),
                None => return None,
            }
        }
    }
}

/// Forward iterator over the whole tree.
pub struct Iter<'a, K, V> {
    tree: &'a BPlusTreeMap<K, V>,
    leaf: Option<&'a LeafNode<K, V>>,
    index: usize,
}

impl<'a, K: Ord + Clone, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.index < leaf.len() {
                let item = (&leaf.keys[self.index], &leaf.values[self.index]);
                self.index += 1;
                return Some(item);
            }
            if leaf.next == NULL_NODE {
                self.leaf = None;
                return None;
            }
            self.leaf = self.tree.leaf_arena.get(leaf.next);
            self.index = 0;
        }
    }
}

/// Reverse iterator over the whole tree.
pub struct IterRev<'a, K, V> {
    tree: &'a BPlusTreeMap<K, V>,
    leaf: Option<&'a LeafNode<K, V>>,
    index: usize,
}

impl<'a, K: Ord + Clone, V> Iterator for IterRev<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.index > 0 {
                self.index -= 1;
                return Some((&leaf.keys[self.index], &leaf.values[self.index]));
            }
            if leaf.prev == NULL_NODE {
                self.leaf = None;
                return None;
            }
            self.leaf = self.tree.leaf_arena.get(leaf.prev);
            self.index = self.leaf.map(|l| l.len()).unwrap_or(0);
        }
    }
}

/// Iterator over a bounded range of the tree, in ascending order.
pub struct Range<'a, K, V> {
    inner: Iter<'a, K, V>,
    end_bound: Option<(K, bool)>,
    skip_first: bool,
    start_excluded_key: Option<K>,
    started: bool,
}

impl<'a, K: Ord + Clone, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.inner.next()?;

        if !self.started {
            self.started = true;
            if self.skip_first && key == self.start_excluded_key.as_ref().unwrap() {
                return self.next();
            }
        }

        if let Some((end, inclusive)) = &self.end_bound {
            let past_end = if *inclusive { key > end } else { key >= end };
            if past_end {
                self.inner.leaf = None;
                return None;
            }
        }

        Some((key, value))
    }
}

/// A remembered position in the tree that does not hold a borrow, so it can
/// be kept across mutating calls. Re-checks the tree's mutation epoch on
/// every use; once the tree has been mutated since the cursor was taken,
/// further reads return `None` instead of risking a stale position.
pub struct Cursor<K> {
    leaf_id: NodeId,
    index: usize,
    epoch: u64,
    _marker: std::marker::PhantomData<fn() -> K>,
}

impl<K: Ord + Clone> Cursor<K> {
    /// A cursor positioned at the first entry of `tree`.
    pub fn at_start<V>(tree: &BPlusTreeMap<K, V>) -> Self {
        Cursor {
            leaf_id: tree.leftmost_leaf,
            index: 0,
            epoch: tree.epoch,
            _marker: std::marker::PhantomData,
        }
    }

    /// Read the entry at this cursor's position in `tree`, or `None` if the
    /// tree has been mutated since the cursor was created or positioned, or
    /// if the position has run past the end.
    pub fn get<'a, V>(&self, tree: &'a BPlusTreeMap<K, V>) -> Option<(&'a K, &'a V)> {
        if tree.epoch != self.epoch {
            return None;
        }
        let leaf = tree.leaf_arena.get(self.leaf_id)?;
        if self.index < leaf.len() {
            Some((&leaf.keys[self.index], &leaf.values[self.index]))
        } else {
            None
        }
    }

    /// Advance to the next entry, still against `tree`'s epoch at the time
    /// of this call. Returns `false` (and leaves the cursor unusable) if
    /// the tree was mutated since the cursor's epoch was last validated.
    pub fn advance<V>(&mut self, tree: &BPlusTreeMap<K, V>) -> bool {
        if tree.epoch != self.epoch {
            return false;
        }
        let Some(leaf) = tree.leaf_arena.get(self.leaf_id) else {
            return false;
        };
        if self.index + 1 < leaf.len() {
            self.index += 1;
            true
        } else if leaf.next != NULL_NODE {
            self.leaf_id = leaf.next;
            self.index = 0;
            true
        } else {
            self.index = leaf.len();
            false
        }
    }
}
