mod common;

use std::collections::BTreeSet;

use avltree::AvlTree;
use proptest::prelude::*;

proptest! {
    #[test]
    fn matches_btreeset(keys in proptest::collection::vec(-500_i64..500, 0..400)) {
        let mut tree = AvlTree::new();
        let mut oracle = BTreeSet::new();

        for key in keys {
            let (cursor, inserted) = tree.insert(key);
            prop_assert_eq!(cursor.get(), Some(&key));
            drop(cursor);

            prop_assert_eq!(inserted, oracle.insert(key));
            prop_assert_eq!(tree.size(), oracle.len());
        }

        tree.assert_valid();
        prop_assert!(tree.iter().eq(oracle.iter()));
        prop_assert!(tree.iter().rev().eq(oracle.iter().rev()));
        prop_assert_eq!(tree.first(), oracle.first());
        prop_assert_eq!(tree.last(), oracle.last());
    }

    #[test]
    fn range_count_matches_btreeset(
        keys in proptest::collection::btree_set(-1000_i64..1000, 0..300),
        queries in proptest::collection::vec((-1100_i64..1100, -1100_i64..1100), 1..50),
    ) {
        let tree: AvlTree<i64> = keys.iter().copied().collect();

        for (a, b) in queries {
            let expected = if a > b { 0 } else { keys.range(a..=b).count() };
            prop_assert_eq!(tree.range_count(&a, &b), expected);
        }
    }

    #[test]
    fn sorted_inserts_stay_balanced(len in 0_i64..3000, descending in any::<bool>()) {
        let tree: AvlTree<i64> = if descending {
            (0..len).rev().collect()
        } else {
            (0..len).collect()
        };

        tree.assert_valid();
        prop_assert_eq!(tree.range_count(&0, &(len - 1)), usize::try_from(len).unwrap());
    }
}
