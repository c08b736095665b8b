mod common;

use std::collections::BTreeSet;

use avltree::AvlTree;
use rand::Rng;

use crate::common::{build, scenario_tree};

fn brute_force(keys: &BTreeSet<i64>, first: i64, second: i64) -> usize {
    if first > second {
        return 0;
    }
    keys.range(first..=second).count()
}

#[test]
fn scenario_ranges() {
    let tree = scenario_tree();

    assert_eq!(tree.range_count(&0, &1000), 10);
    assert_eq!(tree.range_count(&12, &175), 10);
    assert_eq!(tree.range_count(&13, &174), 8);
    assert_eq!(tree.range_count(&20, &20), 1);
    assert_eq!(tree.range_count(&21, &24), 0);
    assert_eq!(tree.range_count(&176, &1000), 0);
    assert_eq!(tree.range_count(&-10, &11), 0);
    assert_eq!(tree.range_count(&30, &130), 5);
}

#[test]
fn inverted_range_is_empty() {
    let tree = scenario_tree();

    assert_eq!(tree.range_count(&175, &12), 0);
    assert_eq!(tree.range_count(&21, &20), 0);
}

#[test]
fn empty_tree() {
    let tree = AvlTree::<i64>::new();

    assert_eq!(tree.range_count(&i64::MIN, &i64::MAX), 0);
    assert_eq!(tree.range_count(&0, &0), 0);
}

#[test]
fn full_range_uses_root_count() {
    let tree = build(0..1000);

    assert_eq!(tree.range_count(&i64::MIN, &i64::MAX), 1000);
    assert_eq!(tree.range_count(&0, &999), 1000);
    assert_eq!(tree.range_count(&1, &998), 998);
}

#[test]
fn random_ranges_against_brute_force() {
    let mut rng = rand::rng();

    let mut keys = BTreeSet::new();
    let mut tree = AvlTree::new();

    for round in 0..2000 {
        let key = rng.random_range(-10_000..10_000);
        assert_eq!(tree.insert(key).1, keys.insert(key));

        if round % 5 == 0 {
            let a = rng.random_range(-11_000..11_000);
            let b = rng.random_range(-11_000..11_000);
            assert_eq!(tree.range_count(&a, &b), brute_force(&keys, a, b), "[{a}, {b}]");
            assert_eq!(
                tree.range_count(&a.min(b), &a.max(b)),
                brute_force(&keys, a.min(b), a.max(b))
            );
        }
    }
    tree.assert_valid();
}
