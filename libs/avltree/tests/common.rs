#![allow(unused, reason = "not used by all tests")]

use avltree::AvlTree;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a test-local subscriber so `RUST_LOG=avltree=trace` shows the rebalancing steps.
pub fn trace() -> tracing::subscriber::DefaultGuard {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .set_default()
}

/// Builds a tree by inserting `keys` in order, checking the invariants after every insertion.
pub fn build(keys: impl IntoIterator<Item = i64>) -> AvlTree<i64> {
    let mut tree = AvlTree::new();
    for key in keys {
        tracing::debug!("inserting {key}");
        tree.insert(key);
        tree.assert_valid();
    }
    tree
}

/// The tree used by the rebalancing and boundary scenarios.
pub fn scenario_tree() -> AvlTree<i64> {
    build([100, 50, 150, 25, 75, 125, 175, 12, 35, 20])
}
