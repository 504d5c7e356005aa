//! Read-only lookups.

use crate::types::BPlusTreeMap;

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// The number of entries currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up the value for `key`.
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(4).unwrap();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get(&1), Some(&"one"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let (leaf_id, _) = self.locate(key);
        self.leaf_arena.get(leaf_id).and_then(|leaf| leaf.get(key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Mutable lookup. Does not change `size` or trigger rebalancing —
    /// only `insert`/`remove` do that.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (leaf_id, _) = self.locate(key);
        self.leaf_arena.get_mut(leaf_id).and_then(|leaf| leaf.get_mut(key))
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.iter_rev().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_empty_tree_is_none() {
        let tree: BPlusTreeMap<i32, i32> = BPlusTreeMap::new(4).unwrap();
        assert_eq!(tree.get(&1), None);
        assert!(!tree.contains_key(&1));
    }

    #[test]
    fn get_mut_allows_in_place_update() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        tree.insert(1, "one".to_string()).unwrap();
        if let Some(v) = tree.get_mut(&1) {
            v.push_str("!");
        }
        assert_eq!(tree.get(&1).map(String::as_str), Some("one!"));
    }

    #[test]
    fn first_and_last_key_value_track_the_extremes() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in [5, 1, 9, 3, 7] {
            tree.insert(i, i).unwrap();
        }
        assert_eq!(tree.first_key_value(), Some((&1, &1)));
        assert_eq!(tree.last_key_value(), Some((&9, &9)));
    }
}
