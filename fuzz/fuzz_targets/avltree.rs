#![no_main]

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::ops::Bound;

use avltree::AvlTree;
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Action<Key> {
    Clear,
    Insert(Key),
    Find(Key),
    LowerBound(Key),
    UpperBound(Key),
    RangeCount(Key, Key),
    Cursor(Option<Key>, Vec<CursorAction>),
}

#[derive(Arbitrary, Debug)]
enum CursorAction {
    Next,
    Prev,
}

#[derive(Arbitrary, Debug)]
enum KeyType {
    U8(Vec<Action<u8>>),
    U16(Vec<Action<u16>>),
    I32(Vec<Action<i32>>),
    U64(Vec<Action<u64>>),
}

fn run<Key: Ord + Copy + Debug>(actions: Vec<Action<Key>>) {
    let mut tree = AvlTree::new();
    let mut set: BTreeSet<Key> = BTreeSet::new();

    for action in actions {
        match action {
            Action::Clear => {
                tree.clear();
                set.clear();
            }
            Action::Insert(key) => {
                let (cursor, inserted) = tree.insert(key);
                assert_eq!(cursor.get(), Some(&key));
                assert_eq!(inserted, set.insert(key));
            }
            Action::Find(key) => {
                assert_eq!(tree.find(&key).get(), set.get(&key));
            }
            Action::LowerBound(key) => {
                assert_eq!(tree.lower_bound(&key).get(), set.range(key..).next());
            }
            Action::UpperBound(key) => {
                let expected = set
                    .range((Bound::Excluded(key), Bound::Unbounded))
                    .next();
                assert_eq!(tree.upper_bound(&key).get(), expected);
            }
            Action::RangeCount(a, b) => {
                let expected = if a > b { 0 } else { set.range(a..=b).count() };
                assert_eq!(tree.range_count(&a, &b), expected);
            }
            Action::Cursor(at, actions) => {
                let keys: Vec<_> = set.iter().copied().collect();
                let (mut cursor, mut index) = match at {
                    Some(at) => (tree.lower_bound(&at), keys.partition_point(|k| *k < at)),
                    None => (tree.begin(), 0),
                };

                for action in actions {
                    match action {
                        CursorAction::Next => {
                            cursor.move_next();
                            index = (index + 1).min(keys.len());
                        }
                        CursorAction::Prev => {
                            cursor.move_prev();
                            // stepping back from the smallest key wraps to the end position
                            index = if index == 0 { keys.len() } else { index - 1 };
                        }
                    }

                    assert_eq!(cursor.is_end(), index == keys.len());
                    assert_eq!(cursor.get(), keys.get(index));
                }
            }
        }

        tree.assert_valid();
        assert_eq!(tree.size(), set.len());
        assert!(tree.iter().eq(set.iter()));
    }
}

fuzz_target!(|actions: KeyType| {
    match actions {
        KeyType::U8(actions) => run(actions),
        KeyType::U16(actions) => run(actions),
        KeyType::I32(actions) => run(actions),
        KeyType::U64(actions) => run(actions),
    }
});
