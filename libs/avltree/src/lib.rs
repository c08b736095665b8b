//! # An augmented AVL tree.
//!
//! [`AvlTree`] is an ordered set of unique keys kept in a height-balanced binary search tree.
//! Every node additionally caches a [`Tag`]: the number of keys in its subtree together with the
//! subtree's smallest and largest key. The tag lets [`AvlTree::range_count`] answer "how many keys
//! fall into `[a, b]`" by summing whole subtrees instead of visiting every matching key.
//!
//! The implementation never recurses. Insertion and cursors work on an explicit root-to-node
//! path and [`AvlTree::clear`] tears the tree down with rotations.
//!
//! ## cursor invalidation
//!
//! A [`Cursor`] holds the path from the root to its element. Cursors borrow the tree, so the
//! borrow checker already rules out using a cursor across an insertion: the only way to obtain a
//! cursor after mutating the tree is to ask the tree for a new one.
//!
//! ## features
//!
//! | Feature | Default | Explanation                                                                         |
//! |:--------|:--------|:------------------------------------------------------------------------------------|
//! | `dot`   | `false` | Enables the `AvlTree::dot` method, which displays the tree in [graphviz format]     |
//!
//! [graphviz format]: https://graphviz.org/doc/info/lang.html

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod cursor;
#[cfg(feature = "dot")]
mod dot;
mod iter;
mod node;
mod utils;

use crate::cursor::PathStack;
use crate::node::Link;
use alloc::vec;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

pub use cursor::Cursor;
#[cfg(feature = "dot")]
pub use dot::Dot;
pub use iter::{Iter, Order, Walk};
pub use node::{Node, Tag};
pub use utils::Side;

/// An ordered set backed by an AVL tree whose nodes carry subtree counts and key bounds.
///
/// Lookups, insertions and boundary searches take O(log n) time. Counting the keys within a range
/// takes time proportional to the number of subtrees straddling the range boundaries, which is
/// O(log n) for a balanced tree.
///
/// Keys are unique: inserting a key that compares equal to an existing one leaves the tree
/// untouched.
pub struct AvlTree<T> {
    pub(crate) root: Link<T>,
    size: usize,
    _owns: PhantomData<T>,
}

// Safety: the tree exclusively owns all of its nodes, sending it sends the keys.
unsafe impl<T: Send> Send for AvlTree<T> {}
// Safety: shared access to the tree only ever hands out shared references to keys.
unsafe impl<T: Sync> Sync for AvlTree<T> {}

impl<T> Drop for AvlTree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AvlTree<T> {
    /// Creates a new, empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            size: 0,
            _owns: PhantomData,
        }
    }

    /// Returns the number of keys in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.root.is_none(), self.size == 0);
        self.size == 0
    }

    /// Returns the number of levels of the tree, `0` for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut curr = self.root_node();
        while let Some(node) = curr {
            height += 1;
            // The balance factor tells us which subtree is the taller one.
            curr = if node.balance > 0 {
                node.child(Side::Right)
            } else {
                node.child(Side::Left)
            };
        }
        height
    }

    /// Returns the root node, if any.
    pub fn root_node(&self) -> Option<&Node<T>> {
        // Safety: the root is owned by the tree and lives as long as `self` is borrowed.
        self.root.map(|root| unsafe { root.as_ref() })
    }

    /// Returns the smallest key in the tree.
    pub fn first(&self) -> Option<&T> {
        self.root_node().map(|root| root.tag().min())
    }

    /// Returns the largest key in the tree.
    pub fn last(&self) -> Option<&T> {
        self.root_node().map(|root| root.tag().max())
    }

    /// Returns a cursor at the smallest key, or the end position if the tree is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        let mut stack = PathStack::new();
        stack.descend_extreme(self.root, Side::Left);
        Cursor::new(self, stack)
    }

    /// Returns a cursor at the end position, one past the largest key.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self, PathStack::new())
    }

    /// Returns a cursor at the largest key, or the end position if the tree is empty.
    pub fn last_cursor(&self) -> Cursor<'_, T> {
        let mut stack = PathStack::new();
        stack.descend_extreme(self.root, Side::Right);
        Cursor::new(self, stack)
    }

    /// Gets an iterator over the keys of the tree, in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            front: self.begin(),
            back: self.last_cursor(),
            remaining: self.size,
        }
    }

    /// Walks all nodes in the given order.
    pub fn walk(&self, order: Order) -> Walk<'_, T> {
        Walk::new(self.root_node(), order)
    }

    /// Walks all nodes, each node before its subtrees.
    pub fn preorder(&self) -> Walk<'_, T> {
        self.walk(Order::Pre)
    }

    /// Walks all nodes in ascending key order.
    pub fn inorder(&self) -> Walk<'_, T> {
        self.walk(Order::In)
    }

    /// Walks all nodes, each node after its subtrees.
    pub fn postorder(&self) -> Walk<'_, T> {
        self.walk(Order::Post)
    }

    /// Calls `visit` for every node in ascending key order.
    pub fn for_each_in_order(&self, visit: impl FnMut(&Node<T>)) {
        self.inorder().for_each(visit);
    }

    /// Calls `visit` for every node, each node before its subtrees.
    pub fn for_each_preorder(&self, visit: impl FnMut(&Node<T>)) {
        self.preorder().for_each(visit);
    }

    /// Returns the balance factors of all nodes, in ascending key order.
    pub fn inorder_balances(&self) -> Vec<i8> {
        self.inorder().map(Node::balance).collect()
    }

    /// Removes all keys from the tree.
    ///
    /// Runs in O(n) time with constant extra memory regardless of the tree's shape: while the
    /// current root has a left child it is rotated to the right, otherwise the root is freed and
    /// its right child takes its place.
    pub fn clear(&mut self) {
        tracing::trace!(size = self.size, "clearing tree");

        let mut curr = self.root.take();
        while let Some(mut node) = curr {
            // Safety: `node` is the root of the remaining, detached part of the tree.
            let node_mut = unsafe { node.as_mut() };

            if let Some(mut left) = node_mut.link(Side::Left) {
                // Safety: `left` is a live child of `node` and a distinct allocation.
                let left_mut = unsafe { left.as_mut() };
                node_mut.children[Side::Left.index()] = left_mut.link(Side::Right);
                left_mut.children[Side::Right.index()] = Some(node);
                curr = Some(left);
            } else {
                curr = node_mut.link(Side::Right);
                // Safety: `node` has no left child and its right child was moved to `curr`, so
                // nothing references it anymore.
                unsafe { Node::free(node) };
            }
        }

        self.size = 0;
    }
}

impl<T> AvlTree<T>
where
    T: Ord,
{
    /// Inserts a key into the tree if no equal key is present.
    ///
    /// Returns a cursor at the key together with `true` if the key was inserted, or a cursor at
    /// the already present, equal key together with `false`.
    pub fn insert(&mut self, key: T) -> (Cursor<'_, T>, bool) {
        let (stack, inserted) = self.probe(key);
        (Cursor::new(self, stack), inserted)
    }

    /// Returns `true` if the tree contains a key equal to `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find(key).is_end()
    }

    /// Returns a cursor at the key equal to `key`, or the end position if there is none.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering on the borrowed
    /// form *must* match the ordering on the key type.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (stack, last) = self.search(key);
        if last == Some(Ordering::Equal) {
            Cursor::new(self, stack)
        } else {
            self.end()
        }
    }

    /// Returns a cursor at the first key that is not less than `key`, or the end position if all
    /// keys are less.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (stack, last) = self.search(key);
        let mut cursor = Cursor::new(self, stack);
        if last == Some(Ordering::Greater) {
            cursor.move_next();
        }
        cursor
    }

    /// Returns a cursor at the first key that is greater than `key`, or the end position if no
    /// key is greater.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (stack, last) = self.search(key);
        let mut cursor = Cursor::new(self, stack);
        if matches!(last, Some(Ordering::Greater | Ordering::Equal)) {
            cursor.move_next();
        }
        cursor
    }

    /// Counts the keys `k` with `first <= k <= second`.
    ///
    /// Returns `0` if `first > second` or the tree is empty.
    ///
    /// Subtrees whose bounds lie entirely inside the range contribute their cached count without
    /// being visited, subtrees entirely outside the range are skipped. Only nodes whose subtree
    /// straddles a range boundary are inspected individually.
    pub fn range_count<Q>(&self, first: &Q, second: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if first > second {
            return 0;
        }
        let Some(root) = self.root_node() else {
            return 0;
        };

        let mut count = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let tag = node.tag();
            let min: &Q = tag.min().borrow();
            let max: &Q = tag.max().borrow();

            if first <= min && max <= second {
                count += tag.count();
            } else if first <= max && min <= second {
                let key: &Q = node.key().borrow();
                if first <= key && key <= second {
                    count += 1;
                }
                stack.extend(node.children());
            }
        }

        count
    }

    /// Descends from the root towards `key`, recording every visited node.
    ///
    /// Returns the path together with the result of comparing `key` against the last node on it;
    /// the descent stops early on an equal key. The ordering is `None` only for an empty tree.
    fn search<Q>(&self, key: &Q) -> (PathStack<T>, Option<Ordering>)
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut stack = PathStack::new();
        let mut last = None;

        let mut curr = self.root;
        while let Some(node) = curr {
            // Safety: `node` is reachable from the root and the tree is borrowed.
            let node_ref = unsafe { node.as_ref() };
            stack.push(node);

            let ord = key.cmp(node_ref.key.borrow());
            last = Some(ord);
            match Side::from_ordering(ord) {
                Some(side) => curr = node_ref.link(side),
                None => break,
            }
        }

        (stack, last)
    }

    /// Inserts `key` unless an equal key exists, and returns the path to the key.
    ///
    /// The descent remembers `y`, the deepest node on the path with a non-zero balance factor, and
    /// its parent `z`. Only nodes from `y` downward change their balance because of the new leaf,
    /// and if anything needs rebalancing it is the subtree rooted at `y`, which takes at most one
    /// single or double rotation.
    fn probe(&mut self, key: T) -> (PathStack<T>, bool) {
        let mut stack = PathStack::new();

        let Some(root) = self.root else {
            tracing::trace!("inserting into empty tree");
            let leaf = Node::new_leaf(key);
            self.root = Some(leaf);
            self.size += 1;
            stack.push(leaf);
            return (stack, true);
        };

        // Step 1: find the position of the new key.
        let mut y = root;
        let mut z: Link<T> = None;
        // Index of `y` in `stack`.
        let mut y_depth = 0;
        // Directions taken from `y` down to the new leaf.
        let mut dirs: Vec<Side> = Vec::new();

        let mut above: Link<T> = None;
        let mut node = root;
        loop {
            // Safety: `node` is reachable from the root and the tree is exclusively borrowed.
            let node_ref = unsafe { node.as_ref() };
            stack.push(node);

            let Some(side) = Side::from_ordering(key.cmp(&node_ref.key)) else {
                tracing::trace!(depth = stack.len() - 1, "key already present");
                return (stack, false);
            };

            if node_ref.balance != 0 {
                y = node;
                z = above;
                y_depth = stack.len() - 1;
                dirs.clear();
            }
            dirs.push(side);

            match node_ref.link(side) {
                Some(child) => {
                    above = Some(node);
                    node = child;
                }
                None => {
                    // Step 2: attach the new leaf.
                    let leaf = Node::new_leaf(key);
                    // Safety: `node` is the last node on the path and its `side` slot is empty.
                    unsafe { (*node.as_ptr()).children[side.index()] = Some(leaf) };
                    self.size += 1;

                    tracing::trace!(%side, depth = stack.len(), "attached new leaf");

                    Self::update_tags(&stack);
                    stack.push(leaf);

                    let stack = self.rebalance_after_insert(stack, leaf, y, z, y_depth, &dirs);
                    return (stack, true);
                }
            }
        }
    }

    /// Steps 3 to 5 of [`Self::probe`]: fix up balance factors from `y` down to the new leaf,
    /// rotate at `y` if it became unbalanced and repair the returned path.
    fn rebalance_after_insert(
        &mut self,
        mut stack: PathStack<T>,
        leaf: NonNull<Node<T>>,
        y: NonNull<Node<T>>,
        z: Link<T>,
        y_depth: usize,
        dirs: &[Side],
    ) -> PathStack<T> {
        // Step 3: update the balance factors on the path below `y`. `dirs` has one entry for each
        // node from `y` down to the leaf's parent.
        for (node, side) in stack.as_slice()[y_depth..].iter().zip(dirs) {
            // Safety: nodes on the path are live and the tree is exclusively borrowed.
            unsafe { (*node.as_ptr()).balance += side.weight() };
        }

        // Step 4: rebalance.
        // Safety: `y` is on the path.
        let heavy = match unsafe { y.as_ref() }.balance {
            -2 => Side::Left,
            2 => Side::Right,
            _ => return stack,
        };
        let w = Self::rotate_at(y, heavy);

        // Hook the rebalanced subtree back into `z`. It holds the same keys as before, so the tags
        // of `z` and everything above it remain valid.
        match z {
            // Safety: `z` is the parent of `y` on the path.
            Some(z) => unsafe {
                let z_mut = &mut *z.as_ptr();
                let slot = if z_mut.link(Side::Left) == Some(y) {
                    Side::Left
                } else {
                    Side::Right
                };
                z_mut.children[slot.index()] = Some(w);
            },
            None => self.root = Some(w),
        }

        // Step 5: the rotation relinked nodes below `z`, so rebuild the path from `w` downward.
        stack.truncate(y_depth);

        let mut curr = Some(w);
        while let Some(node) = curr {
            stack.push(node);
            if node == leaf {
                break;
            }
            // Safety: `node` and `leaf` are live nodes of this tree.
            let ord = unsafe { leaf.as_ref().key.cmp(&node.as_ref().key) };
            curr = Side::from_ordering(ord).and_then(|side| {
                // Safety: see above
                unsafe { node.as_ref() }.link(side)
            });
        }

        stack
    }

    /// Restores balance at `y`, whose subtree on the `heavy` side is two levels taller than the
    /// other one, and returns the new root of the subtree.
    ///
    /// Let `x` be `y`'s child on the heavy side. If `x` leans the same way a single rotation at
    /// `y` suffices, otherwise `x`'s inner child `w` is rotated up twice.
    fn rotate_at(mut y: NonNull<Node<T>>, heavy: Side) -> NonNull<Node<T>> {
        let light = heavy.opposite();

        // Relink and fix the balance factors first. The mutable borrows of `x`, `y` and `w` end
        // with this block, before `Node::update` borrows the nodes again.
        // Safety: `x`, `y` and `w` are distinct live nodes and the tree is exclusively borrowed.
        let (root, dirty) = unsafe {
            let y_mut = y.as_mut();
            let mut x = y_mut
                .link(heavy)
                .expect("unbalanced node must have a child on its heavy side");
            let x_mut = x.as_mut();

            if x_mut.balance == heavy.weight() {
                tracing::trace!(%heavy, "single rotation");

                y_mut.children[heavy.index()] = x_mut.link(light);
                x_mut.children[light.index()] = Some(y);
                x_mut.balance = 0;
                y_mut.balance = 0;

                (x, [Some(y), None])
            } else {
                debug_assert_eq!(x_mut.balance, light.weight());
                tracing::trace!(%heavy, "double rotation");

                let mut w = x_mut
                    .link(light)
                    .expect("inner child must exist when it grew taller");
                let w_mut = w.as_mut();

                x_mut.children[light.index()] = w_mut.link(heavy);
                w_mut.children[heavy.index()] = Some(x);
                y_mut.children[heavy.index()] = w_mut.link(light);
                w_mut.children[light.index()] = Some(y);

                // `w`'s old balance tells which of its subtrees moved under `x` and `y`.
                (x_mut.balance, y_mut.balance) = if w_mut.balance == heavy.weight() {
                    (0, light.weight())
                } else if w_mut.balance == 0 {
                    (0, 0)
                } else {
                    (heavy.weight(), 0)
                };
                w_mut.balance = 0;

                (w, [Some(x), Some(y)])
            }
        };

        // Children first, the new subtree root last.
        for node in dirty.into_iter().flatten().chain([root]) {
            // Safety: the nodes are live and no other reference to them is held anymore.
            unsafe { Node::update(node) };
        }

        root
    }

    /// Recomputes the tags of every node on the path, deepest first.
    fn update_tags(stack: &PathStack<T>) {
        for node in stack.as_slice().iter().rev() {
            // Safety: the path runs from the root downward, so every child of a node on it was
            // updated before the node itself.
            unsafe { Node::update(*node) };
        }
    }

    /// Asserts all invariants of the tree.
    ///
    /// # Panics
    ///
    /// Panics with a message naming the violated invariant.
    #[track_caller]
    pub fn assert_valid(&self) {
        // Heights of the subtrees visited so far. In post-order a node's right subtree is
        // finished right before the node, and its left subtree right before that.
        let mut heights: Vec<usize> = Vec::new();

        for node in self.postorder() {
            let right = node.child(Side::Right).map_or(0, |_| heights.pop().unwrap_or(0));
            let left = node.child(Side::Left).map_or(0, |_| heights.pop().unwrap_or(0));

            assert!(
                left.abs_diff(right) <= 1,
                "AVL violation: subtree heights {left} and {right} differ by more than one"
            );
            let balance_matches = match node.balance {
                -1 => left == right + 1,
                0 => left == right,
                1 => right == left + 1,
                _ => false,
            };
            assert!(
                balance_matches,
                "AVL violation: balance factor {} does not match subtree heights {left} and {right}",
                node.balance
            );

            let mut count = 1;
            for side in Side::BOTH {
                let expected = match node.child(side) {
                    Some(child) => {
                        count += child.tag.count;
                        child.tag.bound_node(side)
                    }
                    None => NonNull::from(node),
                };
                assert_eq!(
                    node.tag.bound_node(side),
                    expected,
                    "Tag violation: {side} bound does not match the {side} child"
                );
            }
            assert_eq!(
                node.tag.count, count,
                "Tag violation: count does not match the children's counts"
            );

            if let Some(left) = node.child(Side::Left) {
                assert!(
                    left.tag.max() < &node.key,
                    "Ordering violation: left subtree is not less than node"
                );
            }
            if let Some(right) = node.child(Side::Right) {
                assert!(
                    right.tag.min() > &node.key,
                    "Ordering violation: right subtree is not greater than node"
                );
            }

            heights.push(1 + left.max(right));
        }

        let height = heights.pop().unwrap_or(0);
        assert!(heights.is_empty(), "walk left dangling subtrees");
        assert_eq!(height, self.height(), "balance factors lead down a wrong path");

        let count = self.root_node().map_or(0, |root| root.tag.count);
        assert_eq!(count, self.size, "size does not match the number of nodes");

        assert!(
            min_nodes_for_height(height) <= self.size,
            "AVL violation: height {height} is too large for {} nodes",
            self.size
        );
    }
}

impl<T> AvlTree<T>
where
    T: Clone,
{
    /// Returns a copy of all keys in ascending order.
    pub fn inorder_keys(&self) -> Vec<T> {
        let mut keys = Vec::with_capacity(self.size);
        keys.extend(self.inorder().map(|node| node.key.clone()));
        keys
    }

    /// Returns a copy of all keys in pre-order, i.e. every key before the keys of its subtrees.
    pub fn preorder_keys(&self) -> Vec<T> {
        let mut keys = Vec::with_capacity(self.size);
        keys.extend(self.preorder().map(|node| node.key.clone()));
        keys
    }
}

#[cfg(feature = "dot")]
impl<T> AvlTree<T>
where
    T: fmt::Display,
{
    /// Returns a display adapter that renders the tree in graphviz format.
    pub fn dot(&self) -> Dot<'_, T> {
        Dot { tree: self }
    }
}

/// The minimum number of nodes an AVL tree of the given height holds.
///
/// `N(h) = N(h - 1) + N(h - 2) + 1`, which grows like the Fibonacci numbers and bounds the height
/// of an AVL tree with `n` nodes by roughly `1.44 * log2(n + 2)`.
fn min_nodes_for_height(height: usize) -> usize {
    let (mut prev, mut curr) = (0_usize, 0_usize);
    for h in 0..height {
        let next = if h == 0 {
            1
        } else {
            curr.saturating_add(prev).saturating_add(1)
        };
        prev = curr;
        curr = next;
    }
    curr
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
