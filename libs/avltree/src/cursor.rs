use crate::node::{Link, Node};
use crate::utils::Side;
use crate::AvlTree;
use core::fmt;
use core::ptr::{self, NonNull};
use smallvec::SmallVec;

/// Number of ancestors a [`PathStack`] holds without spilling to the heap.
///
/// An AVL tree of height 32 holds at least 5.7 million nodes, so paths almost never allocate.
const INLINE_DEPTH: usize = 32;

/// The chain of nodes from the root of a tree down to a target node, root first.
///
/// The stack does not own the nodes it references. It stays valid only as long as no node on it
/// gets relinked, i.e. until the next structural mutation of the tree that touches the path.
pub(crate) struct PathStack<T> {
    nodes: SmallVec<[NonNull<Node<T>>; INLINE_DEPTH]>,
}

impl<T> PathStack<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SmallVec::new(),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, node: NonNull<Node<T>>) {
        self.nodes.push(node);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<NonNull<Node<T>>> {
        self.nodes.pop()
    }

    #[inline]
    pub(crate) fn top(&self) -> Option<NonNull<Node<T>>> {
        self.nodes.last().copied()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    pub(crate) fn as_slice(&self) -> &[NonNull<Node<T>>] {
        &self.nodes
    }

    /// Pushes `from` and then keeps following children on `side` until there are none left.
    ///
    /// Starting at a subtree root with `Side::Left` this lands on the subtree's minimum, with
    /// `Side::Right` on its maximum.
    pub(crate) fn descend_extreme(&mut self, from: Link<T>, side: Side) {
        let mut curr = from;
        while let Some(node) = curr {
            self.nodes.push(node);
            // Safety: `node` is reachable from a live tree.
            curr = unsafe { node.as_ref() }.link(side);
        }
    }

    /// Moves the stack to the in-order neighbour on `side` of its current top.
    ///
    /// Leaves the stack empty when the top was the extreme node on that side.
    pub(crate) fn step(&mut self, side: Side) {
        let Some(top) = self.top() else {
            return;
        };

        // Safety: every node on the stack is part of a live tree.
        if let Some(child) = unsafe { top.as_ref() }.link(side) {
            self.descend_extreme(Some(child), side.opposite());
            return;
        }

        // Climb while we are coming out of the `side` subtree of our parent; the first ancestor we
        // reach from its opposite side is the neighbour.
        let mut prev = self.pop();
        while let Some(parent) = self.top()
            // Safety: every node on the stack is part of a live tree.
            && unsafe { parent.as_ref() }.link(side) == prev
        {
            prev = self.pop();
        }
    }
}

impl<T> Clone for PathStack<T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
        }
    }
}

impl<T> PartialEq for PathStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl<T> Eq for PathStack<T> {}

/// A read-only cursor over the in-order positions of an [`AvlTree`].
///
/// A cursor points either at an element or at the *end* position, one past the largest element.
/// Moving forward from the end is a no-op; moving backward from the end lands on the largest
/// element.
///
/// Internally the cursor keeps the whole path from the root to its element, so stepping never
/// needs parent pointers and costs amortized O(1).
pub struct Cursor<'a, T> {
    pub(crate) stack: PathStack<T>,
    pub(crate) tree: &'a AvlTree<T>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(tree: &'a AvlTree<T>, stack: PathStack<T>) -> Self {
        Self { stack, tree }
    }

    /// Returns the element at the cursor, or `None` if the cursor is at the end position.
    pub fn get(&self) -> Option<&'a T> {
        // Safety: the cursor borrows the tree, so every node on its path is alive and unmodified.
        self.stack.top().map(|node| unsafe { &(*node.as_ptr()).key })
    }

    /// Returns `true` if the cursor is at the end position.
    pub fn is_end(&self) -> bool {
        self.stack.is_empty()
    }

    /// Moves the cursor to the next larger element, or to the end position after the largest one.
    pub fn move_next(&mut self) {
        self.stack.step(Side::Right);
    }

    /// Moves the cursor to the next smaller element.
    ///
    /// From the end position this moves to the largest element. Moving back from the smallest
    /// element yields the end position.
    pub fn move_prev(&mut self) {
        if self.stack.is_empty() {
            self.stack.descend_extreme(self.tree.root, Side::Right);
        } else {
            self.stack.step(Side::Left);
        }
    }

    /// Returns the element after the cursor without moving it.
    pub fn peek_next(&self) -> Option<&'a T> {
        let mut next = self.clone();
        next.move_next();
        next.get()
    }

    /// Returns the element before the cursor without moving it.
    pub fn peek_prev(&self) -> Option<&'a T> {
        let mut prev = self.clone();
        prev.move_prev();
        prev.get()
    }

    /// Returns the keys on the path from the root down to the cursor's element.
    ///
    /// The path of the end position is empty.
    pub fn path(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.stack
            .as_slice()
            .iter()
            // Safety: the cursor borrows the tree, so every node on its path is alive.
            .map(|node| unsafe { &(*node.as_ptr()).key })
    }

    /// Returns the tree this cursor belongs to.
    pub fn tree(&self) -> &'a AvlTree<T> {
        self.tree
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            tree: self.tree,
        }
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    /// Two cursors are equal if they belong to the same tree and point at the same position.
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.stack == other.stack
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("current", &self.get())
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlTree;
    use alloc::vec::Vec;

    fn tree_of(keys: &[u32]) -> AvlTree<u32> {
        keys.iter().copied().collect()
    }

    #[test]
    fn walks_forward_and_backward() {
        let tree = tree_of(&[50, 20, 80, 10, 30, 70, 90, 60]);

        let mut cursor = tree.begin();
        let mut forward = Vec::new();
        while let Some(key) = cursor.get() {
            forward.push(*key);
            cursor.move_next();
        }
        assert_eq!(forward, [10, 20, 30, 50, 60, 70, 80, 90]);
        assert!(cursor.is_end());
        assert_eq!(cursor, tree.end());

        let mut backward = Vec::new();
        cursor.move_prev();
        while let Some(key) = cursor.get() {
            backward.push(*key);
            cursor.move_prev();
        }
        forward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn end_is_sticky_forward() {
        let tree = tree_of(&[1, 2, 3]);
        let mut cursor = tree.end();
        cursor.move_next();
        assert!(cursor.is_end());
        cursor.move_prev();
        assert_eq!(cursor.get(), Some(&3));
    }

    #[test]
    fn empty_tree_cursors() {
        let tree = AvlTree::<u32>::new();
        assert_eq!(tree.begin(), tree.end());
        let mut cursor = tree.end();
        cursor.move_prev();
        assert!(cursor.is_end());
    }

    #[test]
    fn peeking_does_not_move() {
        let tree = tree_of(&[4, 2, 6]);
        let cursor = tree.find(&4);
        assert_eq!(cursor.peek_next(), Some(&6));
        assert_eq!(cursor.peek_prev(), Some(&2));
        assert_eq!(cursor.get(), Some(&4));
    }

    #[test]
    fn path_starts_at_root() {
        let tree = tree_of(&[2, 1, 3]);
        let cursor = tree.find(&3);
        assert_eq!(cursor.path().copied().collect::<Vec<_>>(), [2, 3]);
        assert_eq!(tree.end().path().count(), 0);
    }

    #[test]
    fn cursors_of_different_trees_differ() {
        let a = tree_of(&[1]);
        let b = tree_of(&[1]);
        assert_ne!(a.begin(), b.begin());
        assert_eq!(a.end(), a.end());
        assert_ne!(a.end(), b.end());
    }
}
