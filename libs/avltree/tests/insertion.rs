mod common;

use avltree::AvlTree;
use rand::seq::SliceRandom;

use crate::common::{build, scenario_tree, trace};

#[test]
fn smoke() {
    let _trace = trace();

    let tree = build([2, 1]);

    assert_eq!(tree.inorder_keys(), [1, 2]);
    assert_eq!(tree.preorder_keys(), [2, 1]);
    assert_eq!(tree.inorder_balances(), [0, -1]);
    assert_eq!(tree.size(), 2);
}

#[test]
fn single_rotation_below_root() {
    let _trace = trace();

    let tree = scenario_tree();

    assert_eq!(
        tree.preorder_keys(),
        [100, 25, 12, 20, 50, 35, 75, 150, 125, 175]
    );
    assert_eq!(
        tree.inorder_keys(),
        [12, 20, 25, 35, 50, 75, 100, 125, 150, 175]
    );
    assert_eq!(tree.inorder_balances(), [1, 0, 0, 0, 0, 0, -1, 0, 0, 0]);
}

#[test]
fn double_rotation_at_root() {
    let tree = build([100, 150, 125]);

    assert_eq!(tree.preorder_keys(), [125, 100, 150]);
    assert_eq!(tree.inorder_balances(), [0, 0, 0]);
}

#[test]
fn all_rotation_cases() {
    // (insertions, expected preorder, expected balances in key order)
    let cases: [(&[i64], &[i64], &[i8]); 8] = [
        // single rotation, left heavy
        (&[3, 2, 1], &[2, 1, 3], &[0, 0, 0]),
        // left-right, inner node leaned left
        (
            &[100, 50, 150, 25, 75, 60],
            &[75, 50, 25, 60, 100, 150],
            &[0, 0, 0, 0, 1, 0],
        ),
        // left-right, inner node leaned right
        (
            &[100, 50, 150, 25, 75, 80],
            &[75, 50, 25, 100, 80, 150],
            &[0, -1, 0, 0, 0, 0],
        ),
        // left-right, inner node is the new leaf
        (&[3, 1, 2], &[2, 1, 3], &[0, 0, 0]),
        // single rotation, right heavy
        (&[1, 2, 3], &[2, 1, 3], &[0, 0, 0]),
        // right-left, inner node leaned right
        (
            &[100, 50, 150, 125, 175, 140],
            &[125, 100, 50, 150, 140, 175],
            &[0, -1, 0, 0, 0, 0],
        ),
        // right-left, inner node is the new leaf
        (&[1, 3, 2], &[2, 1, 3], &[0, 0, 0]),
        // right-left, inner node leaned left
        (
            &[100, 50, 150, 125, 175, 110],
            &[125, 100, 50, 110, 150, 175],
            &[0, 0, 0, 0, 1, 0],
        ),
    ];

    for (keys, preorder, balances) in cases {
        let tree = build(keys.iter().copied());
        assert_eq!(tree.preorder_keys(), preorder, "preorder after {keys:?}");
        assert_eq!(tree.inorder_balances(), balances, "balances after {keys:?}");
    }
}

#[test]
fn rotation_deep_in_the_tree() {
    let tree = build([100, 50, 150, 20, 120, 200, 110, 135, 170, 300, 130]);

    assert_eq!(
        tree.preorder_keys(),
        [120, 100, 50, 20, 110, 150, 135, 130, 200, 170, 300]
    );
    assert_eq!(
        tree.inorder_balances(),
        [0, -1, -1, 0, 0, 0, -1, 0, 0, 0, 0]
    );
}

#[test]
fn ascending_then_descending() {
    let tree = build((0..6).chain((6..=15).rev()).chain([16]));

    assert_eq!(
        tree.preorder_keys(),
        [5, 3, 1, 0, 2, 4, 13, 9, 7, 6, 8, 11, 10, 12, 15, 14, 16]
    );
    assert_eq!(tree.inorder_keys(), (0..=16).collect::<Vec<_>>());
}

#[test]
fn zig_zag_from_both_ends() {
    let tree = build((0..16).flat_map(|i| [i, 32 - i]));

    assert_eq!(
        tree.preorder_keys(),
        [
            8, 4, 2, 1, 0, 3, 6, 5, 7, 21, 14, 11, 10, 9, 13, 12, 19, 17, 15, 18, 20, 26, 23,
            22, 24, 25, 29, 27, 28, 31, 30, 32
        ]
    );
    assert_eq!(tree.size(), 32);
}

#[test]
fn duplicates_are_rejected() {
    let mut tree = scenario_tree();
    let keys = tree.inorder_keys();
    let balances = tree.inorder_balances();

    for key in keys.clone() {
        let (cursor, inserted) = tree.insert(key);
        assert!(!inserted);
        assert_eq!(cursor.get(), Some(&key));
    }

    assert_eq!(tree.size(), keys.len());
    assert_eq!(tree.inorder_keys(), keys);
    assert_eq!(tree.inorder_balances(), balances);
    tree.assert_valid();
}

#[test]
fn inserted_flag_and_cursor() {
    let mut tree = AvlTree::new();

    let (cursor, inserted) = tree.insert(10);
    assert!(inserted);
    assert_eq!(cursor.get(), Some(&10));

    // this insertion rotates at the root
    tree.insert(20);
    let (cursor, inserted) = tree.insert(30);
    assert!(inserted);
    assert_eq!(cursor.get(), Some(&30));
    assert_eq!(cursor.path().copied().collect::<Vec<_>>(), [20, 30]);
}

#[test]
fn random_inserts() {
    let mut nums: Vec<i64> = (0..2000).collect();
    nums.shuffle(&mut rand::rng());

    let mut tree = AvlTree::new();
    for &key in &nums {
        tree.insert(key);
    }
    tree.assert_valid();

    nums.sort_unstable();
    assert_eq!(tree.inorder_keys(), nums);
    assert_eq!(tree.root_node().map(|root| root.tag().count()), Some(2000));
}

#[test]
fn export_hooks_see_every_node() {
    let tree = scenario_tree();

    let mut inorder = Vec::new();
    tree.for_each_in_order(|node| inorder.push((*node.key(), node.tag().count())));
    assert_eq!(inorder.len(), tree.size());
    assert!(inorder.windows(2).all(|w| w[0].0 < w[1].0));

    let mut preorder = Vec::new();
    tree.for_each_preorder(|node| preorder.push(*node.key()));
    assert_eq!(preorder, tree.preorder_keys());

    let root = tree.root_node().unwrap();
    assert_eq!(*root.key(), 100);
    assert_eq!(root.tag().count(), 10);
    assert_eq!((*root.tag().min(), *root.tag().max()), (12, 175));
}

#[test]
fn collects_and_extends() {
    let mut tree: AvlTree<i64> = [5, 1, 5, 3].into_iter().collect();
    assert_eq!(tree.size(), 3);

    tree.extend([2, 4, 1]);
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    assert_eq!((&tree).into_iter().len(), 5);
}
