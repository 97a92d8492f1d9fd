use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

fn insert_find_all(keys: &[i64]) {
    let mut tree = WavlTree::new();

    for &key in keys {
        tree.insert(key, key * 10).expect("keys are distinct");
        tree.assert_invariants();
    }

    for &key in keys {
        assert_eq!(tree.get(key), Some(&(key * 10)), "item not found");
    }

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    assert_eq!(tree.keys_in_order(), sorted);
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

// Calls `f` with every permutation of `keys`.
fn for_each_permutation(keys: &mut [i64], k: usize, f: &mut impl FnMut(&[i64])) {
    if k == keys.len() {
        f(keys);
        return;
    }

    for i in k..keys.len() {
        keys.swap(k, i);
        for_each_permutation(keys, k + 1, f);
        keys.swap(k, i);
    }
}

#[test]
fn six_elems_find() {
    for_each_permutation(&mut [0, 1, 2, 3, 4, 5], 0, &mut insert_find_all);
}

fn insert_remove_all(keys: &[i64]) {
    let mut tree = WavlTree::new();

    for &key in keys {
        tree.insert(key, ()).expect("keys are distinct");
        tree.assert_invariants();
    }

    for &key in keys {
        tree.delete(key).expect("item not found");
        tree.assert_invariants();
    }
    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(key, ()).expect("keys are distinct");
        tree.assert_invariants();
    }

    for &key in keys.iter().rev() {
        tree.delete(key).expect("item not found");
        tree.assert_invariants();
    }
    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_six() {
    for_each_permutation(&mut [0, 1, 2, 3, 4, 5], 0, &mut insert_remove_all);
}

#[test]
fn remove_seven_in_every_order() {
    // Fixed insertion order, every deletion order.
    let insert = [3, 1, 5, 0, 2, 4, 6];
    for_each_permutation(&mut [0, 1, 2, 3, 4, 5, 6], 0, &mut |order: &[i64]| {
        let mut tree = WavlTree::new();
        for &key in &insert {
            tree.insert(key, ()).unwrap();
        }
        for (deleted, &key) in order.iter().enumerate() {
            tree.delete(key).unwrap();
            tree.assert_invariants();
            assert_eq!(tree.len(), insert.len() - deleted - 1);
            assert_eq!(tree.get(key), None);
        }
        assert!(tree.is_empty());
    });
}

#[test]
fn empty_tree_queries() {
    let mut tree: WavlTree<&str> = WavlTree::new();

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.get(1), None);
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
    assert_eq!(tree.select(1), None);
    assert!(tree.root().is_none());
    assert!(tree.keys_in_order().is_empty());
    assert!(tree.values_in_order().is_empty());
    assert_eq!(tree.delete(1), Err(WavlError::NotFound(1)));
    assert_eq!(tree.pop_first(), None);
    assert_eq!(tree.pop_last(), None);
}

#[test]
fn sorted_materialization() {
    let mut tree = WavlTree::new();
    for (key, value) in [(10, "ten"), (20, "twenty"), (5, "five"), (15, "fifteen"), (25, "twenty-five")] {
        tree.insert(key, value).unwrap();
    }
    tree.assert_invariants();

    assert_eq!(tree.keys_in_order(), vec![5, 10, 15, 20, 25]);
    assert_eq!(
        tree.values_in_order(),
        vec![&"five", &"ten", &"fifteen", &"twenty", &"twenty-five"]
    );
    assert_eq!(tree.select(3), Some(&"fifteen"));
    assert_eq!(tree.min(), Some(&"five"));
    assert_eq!(tree.max(), Some(&"twenty-five"));
    assert_eq!(tree.iter().rev().map(|(k, _)| k).collect::<Vec<_>>(), vec![25, 20, 15, 10, 5]);
    assert_eq!(tree.iter().len(), 5);
}

#[test]
fn duplicate_insert_leaves_tree_unchanged() {
    let mut tree = WavlTree::new();
    tree.insert(1, "a").unwrap();
    tree.insert(2, "b").unwrap();

    assert_eq!(tree.insert(1, "c"), Err(WavlError::DuplicateKey(1)));
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get(1), Some(&"a"));
    tree.assert_invariants();
}

#[test]
fn missing_delete_leaves_tree_unchanged() {
    let mut tree = WavlTree::new();
    tree.insert(1, "a").unwrap();
    tree.insert(3, "c").unwrap();

    assert_eq!(tree.delete(2), Err(WavlError::NotFound(2)));
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.keys_in_order(), vec![1, 3]);
    tree.assert_invariants();
}

#[test]
fn error_messages() {
    assert_eq!(WavlError::DuplicateKey(7).to_string(), "key 7 is already present");
    assert_eq!(WavlError::NotFound(-3).to_string(), "key -3 is not present");
}

#[test]
fn delete_root_with_two_children() {
    let mut tree = WavlTree::new();
    for key in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(key, key).unwrap();
    }

    // The successor 5 takes the root's place, rank and size.
    assert_eq!(tree.delete(4), Ok(0));
    tree.assert_invariants();

    let root = tree.root().unwrap();
    assert_eq!(root.key(), 5);
    assert_eq!(root.rank(), 2);
    assert_eq!(root.subtree_size(), 6);
    assert_eq!(root.left().map(|n| n.key()), Some(2));
    assert_eq!(root.right().map(|n| n.key()), Some(6));
    assert_eq!(tree.keys_in_order(), vec![1, 2, 3, 5, 6, 7]);
}

#[test]
fn delete_root_whose_successor_is_its_right_child() {
    let mut tree = WavlTree::new();
    for key in [2, 1, 3] {
        tree.insert(key, ()).unwrap();
    }

    tree.delete(2).unwrap();
    tree.assert_invariants();

    let root = tree.root().unwrap();
    assert_eq!(root.key(), 3);
    assert_eq!(root.subtree_size(), 2);
    assert_eq!(root.left().map(|n| n.key()), Some(1));
    assert!(root.right().is_none());
}

#[test]
fn delete_unary_root() {
    let mut tree = WavlTree::new();
    tree.insert(1, ()).unwrap();
    tree.insert(2, ()).unwrap();

    assert_eq!(tree.delete(1), Ok(0));
    tree.assert_invariants();
    assert_eq!(tree.root().map(|n| (n.key(), n.rank())), Some((2, 0)));
    assert_eq!(tree.first_key_value(), Some((2, &())));
}

// Builds the perfect tree on 1..=15, whose ranks equal the node heights.
fn perfect_fifteen() -> WavlTree<()> {
    let mut tree = WavlTree::new();
    for key in [8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7, 9, 11, 13, 15] {
        tree.insert(key, ()).unwrap();
    }
    tree.assert_invariants();
    tree
}

fn rank_of(tree: &WavlTree<()>, key: i64) -> i8 {
    let mut cur = tree.root();
    while let Some(node) = cur {
        match key.cmp(&node.key()) {
            core::cmp::Ordering::Less => cur = node.left(),
            core::cmp::Ordering::Equal => return node.rank(),
            core::cmp::Ordering::Greater => cur = node.right(),
        }
    }
    panic!("key {key} not found");
}

fn delete_all(tree: &mut WavlTree<()>, keys: &[i64]) -> Vec<usize> {
    keys.iter()
        .map(|&key| {
            let ops = tree.delete(key).unwrap();
            tree.assert_invariants();
            ops
        })
        .collect()
}

#[test]
fn delete_demote_chain_reaches_root() {
    let mut tree = perfect_fifteen();
    assert_eq!(rank_of(&tree, 8), 3);

    // Thin out both sides: each unary node that loses its last child is demoted.
    assert_eq!(delete_all(&mut tree, &[1, 3, 5, 7, 2]), vec![0, 1, 0, 1, 1]);
    assert_eq!(delete_all(&mut tree, &[9, 11, 13, 15, 10]), vec![0, 1, 0, 1, 1]);
    assert_eq!(rank_of(&tree, 4), 1);
    assert_eq!(rank_of(&tree, 12), 1);

    // 4 becomes a 2,2 leaf and is demoted, making it a 3-child of 8, whose other child 12 is a
    // 2-child. 8 is demoted in turn.
    assert_eq!(tree.delete(6), Ok(2));
    tree.assert_invariants();
    assert_eq!(rank_of(&tree, 8), 2);
    assert_eq!(rank_of(&tree, 4), 0);
    assert_eq!(tree.keys_in_order(), vec![4, 8, 12, 14]);
}

#[test]
fn delete_double_demote() {
    let mut tree = perfect_fifteen();

    assert_eq!(delete_all(&mut tree, &[1, 3, 5, 7, 2]), vec![0, 1, 0, 1, 1]);
    assert_eq!(delete_all(&mut tree, &[9, 11, 13, 15]), vec![0, 1, 0, 1]);
    assert_eq!(rank_of(&tree, 12), 2);

    // 12 is a 2,2 1-child of 8, so both are demoted after 4 is.
    assert_eq!(tree.delete(6), Ok(3));
    tree.assert_invariants();
    assert_eq!(rank_of(&tree, 8), 2);
    assert_eq!(rank_of(&tree, 12), 1);
}

#[test]
fn delete_single_rotation() {
    let mut tree = WavlTree::new();
    for key in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(key, ()).unwrap();
    }
    assert_eq!(delete_all(&mut tree, &[1, 3]), vec![0, 1]);

    // 2 leaves 4 with an external 3-child; 6 rotates up.
    assert_eq!(tree.delete(2), Ok(1));
    tree.assert_invariants();
    assert_eq!(tree.root().map(|n| (n.key(), n.rank())), Some((6, 2)));
    assert_eq!(rank_of(&tree, 4), 1);
}

#[test]
fn delete_single_rotation_demotes_leaf() {
    let mut tree = WavlTree::new();
    for key in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(key, ()).unwrap();
    }
    assert_eq!(delete_all(&mut tree, &[1, 3, 5]), vec![0, 1, 0]);

    // After 6 rotates up, 4 is a leaf and drops to rank 0.
    assert_eq!(tree.delete(2), Ok(1));
    tree.assert_invariants();
    assert_eq!(tree.root().map(|n| (n.key(), n.rank())), Some((6, 2)));
    assert_eq!(rank_of(&tree, 4), 0);
    assert_eq!(rank_of(&tree, 7), 0);
}

#[test]
fn delete_double_rotation() {
    let mut tree = WavlTree::new();
    for key in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(key, ()).unwrap();
    }
    assert_eq!(delete_all(&mut tree, &[1, 3, 7]), vec![0, 1, 0]);

    // 5 is lifted above both 4 and 6.
    assert_eq!(tree.delete(2), Ok(2));
    tree.assert_invariants();
    assert_eq!(tree.root().map(|n| (n.key(), n.rank())), Some((5, 2)));
    assert_eq!(rank_of(&tree, 4), 0);
    assert_eq!(rank_of(&tree, 6), 0);
}

#[test]
fn cached_extremes_follow_deletes() {
    let mut tree = WavlTree::new();
    for key in 0..32 {
        tree.insert(key, key).unwrap();
    }

    for key in 0..16 {
        assert_eq!(tree.min(), Some(&key));
        assert_eq!(tree.max(), Some(&(31 - key)));
        tree.delete(key).unwrap();
        tree.delete(31 - key).unwrap();
        tree.assert_invariants();
    }
    assert!(tree.is_empty());
}

#[test]
fn map_conveniences() {
    let mut tree = WavlTree::with_capacity(8);
    for key in [3, 1, 2] {
        tree.insert(key, key.to_string()).unwrap();
    }

    tree.get_mut(2).unwrap().push('!');
    assert_eq!(tree.get(2).map(String::as_str), Some("2!"));
    assert!(tree.contains_key(3));
    assert!(!tree.contains_key(4));

    assert_eq!(tree.pop_first(), Some((1, "1".to_string())));
    assert_eq!(tree.pop_last(), Some((3, "3".to_string())));
    assert_eq!(tree.remove(2), Some("2!".to_string()));
    assert_eq!(tree.remove(2), None);
    tree.assert_invariants();

    tree.insert(9, "9".to_string()).unwrap();
    tree.clear();
    assert!(tree.is_empty());
    tree.assert_invariants();
}

#[test]
fn node_views_expose_structure() {
    let mut tree = WavlTree::new();
    for key in [2, 1, 3] {
        tree.insert(key, key * 100).unwrap();
    }

    let root = tree.root().unwrap();
    assert_eq!((root.key(), *root.value(), root.rank(), root.subtree_size()), (2, 200, 1, 3));
    assert!(root.parent().is_none());

    let left = root.left().unwrap();
    assert!(left.is_leaf());
    assert_eq!(left.parent(), Some(root));
    assert_eq!((left.key(), left.rank(), left.subtree_size()), (1, 0, 1));
}

#[test]
fn ascending_inserts_stay_logarithmic() {
    let mut tree = WavlTree::new();
    for key in 0..1024 {
        tree.insert(key, ()).unwrap();
    }
    tree.assert_invariants();

    // Rank is at most 2 log2(n).
    assert!(tree.root().unwrap().rank() <= 20);
    assert_eq!(tree.select(512).copied(), Some(()));
    assert_eq!(tree.position_of(511), Some(512));
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn insert_then_delete_all_empties(keys in proptest::collection::hash_set(any::<i64>(), 0..200), seed in any::<u64>()) {
        let mut tree = WavlTree::new();
        let mut keys: Vec<i64> = keys.into_iter().collect();

        for (i, &key) in keys.iter().enumerate() {
            prop_assert!(tree.insert(key, i).is_ok());
            prop_assert_eq!(tree.len(), i + 1);
        }
        tree.assert_invariants();

        // Delete in an order unrelated to the insertion order.
        keys.sort_unstable_by_key(|&k| (k as u64).wrapping_mul(seed | 1));
        for &key in &keys {
            let before = tree.len();
            prop_assert!(tree.delete(key).is_ok());
            prop_assert_eq!(tree.len(), before - 1);
            prop_assert_eq!(tree.get(key), None);
        }
        prop_assert!(tree.is_empty());
        tree.assert_invariants();
    }
}
