//! The concrete end-to-end scenarios from the design: fixed input sequences
//! with a fixed expected shape, as opposed to the randomized property tests
//! in `invariants.rs`.

use bplustree::BPlusTreeMap;

#[test]
fn ascending_insert_to_ten_forms_a_two_level_tree() {
    let mut tree = BPlusTreeMap::new(4).unwrap();
    for i in 1..=10 {
        tree.insert(i, i).unwrap();
    }
    assert_eq!(tree.len(), 10);
    assert_eq!(tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
    tree.validate().unwrap();

    let dump = tree.debug_dump();
    let root_line = dump.lines().next().unwrap();
    assert!(root_line.starts_with("branch#"), "root should be a branch: {root_line}");
    assert_eq!(dump.lines().filter(|l| l.trim_start().starts_with("branch#")).count(), 1);
}

#[test]
fn out_of_order_insert_sequence_still_sorts() {
    let mut tree = BPlusTreeMap::new(4).unwrap();
    let order = [15, 3, 8, 12, 1, 20, 7, 18, 5, 10];
    for (i, k) in order.iter().enumerate() {
        tree.insert(*k, i).unwrap();
    }
    let keys: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![1, 3, 5, 7, 8, 10, 12, 15, 18, 20]);

    for (i, k) in order.iter().enumerate() {
        assert_eq!(tree.get(k), Some(&i));
    }
}

#[test]
fn remove_every_third_key_from_one_to_twenty() {
    let mut tree = BPlusTreeMap::new(4).unwrap();
    for i in 1..=20 {
        tree.insert(i, i).unwrap();
    }
    for i in (3..=18).step_by(3) {
        assert_eq!(tree.remove(&i), Some(i));
    }
    assert_eq!(tree.len(), 14);
    tree.validate().unwrap();
    let expected: Vec<i32> = (1..=20).filter(|k| k % 3 != 0).collect();
    assert_eq!(tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(), expected);
}

#[test]
fn removing_almost_everything_from_a_hundred_entries_shrinks_height() {
    let mut tree = BPlusTreeMap::new(5).unwrap();
    for i in 1..=100 {
        tree.insert(i, i).unwrap();
    }
    for i in 1..=95 {
        tree.remove(&i);
    }
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![96, 97, 98, 99, 100]);
    assert_eq!(tree.first_key_value(), Some((&96, &96)));
    tree.validate().unwrap();
}

#[test]
fn five_inserts_force_a_root_split_then_two_removals_keep_the_chain_valid() {
    let mut tree = BPlusTreeMap::new(4).unwrap();
    for k in [10, 20, 30, 40, 50] {
        tree.insert(k, k).unwrap();
    }
    tree.validate().unwrap();
    let leaf_count_after_split = tree.debug_dump().lines().filter(|l| l.trim_start().starts_with("leaf#")).count();
    assert!(leaf_count_after_split >= 2);

    tree.remove(&20);
    tree.remove(&40);
    tree.validate().unwrap();
    assert_eq!(tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![10, 30, 50]);
}

#[test]
fn range_over_an_arbitrary_tree_without_mutating_is_ascending_and_bounded() {
    let mut tree = BPlusTreeMap::new(6).unwrap();
    for i in 0..100 {
        tree.insert(i, i * 2).unwrap();
    }
    let collected: Vec<_> = tree.range(25..75).map(|(k, v)| (*k, *v)).collect();
    assert_eq!(collected.len(), 50);
    assert_eq!(collected.first(), Some(&(25, 50)));
    assert_eq!(collected.last(), Some(&(74, 148)));
    assert!(collected.windows(2).all(|w| w[0].0 < w[1].0));

    assert_eq!(tree.range(200..300).count(), 0);
}
