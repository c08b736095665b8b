use crate::utils::Side;
use alloc::boxed::Box;
use core::fmt;
use core::ptr::NonNull;

/// An owning link to a child node.
///
/// Every node is allocated through [`Node::new_leaf`] and referenced by exactly one link: either
/// a child slot of its parent or the root slot of the tree. The tree frees nodes in
/// [`AvlTree::clear`](crate::AvlTree::clear).
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

/// A single cell of an [`AvlTree`](crate::AvlTree).
///
/// Nodes are only ever handed out as shared references by the tree's read-only traversals, so
/// callers may inspect the structure (e.g. to export it) but never relink it.
pub struct Node<T> {
    pub(crate) key: T,
    /// `height(right) - height(left)`, always one of `-1`, `0` or `1` between operations.
    pub(crate) balance: i8,
    pub(crate) children: [Link<T>; 2],
    pub(crate) tag: Tag<T>,
}

/// Cached per-subtree aggregate of a [`Node`].
///
/// The tag is derived state: it is recomputed from the node's children by [`Node::update`]
/// whenever they change and is never consulted to decide where a key belongs.
pub struct Tag<T> {
    /// Number of nodes in the subtree, including the node itself.
    pub(crate) count: usize,
    /// Nodes holding the minimum (`bounds[0]`) and maximum (`bounds[1]`) key of the subtree.
    /// These are observational pointers into the same tree, not owning links.
    pub(crate) bounds: [NonNull<Node<T>>; 2],
}

impl<T> Node<T> {
    /// Allocates a new, unlinked leaf with an up-to-date tag.
    pub(crate) fn new_leaf(key: T) -> NonNull<Self> {
        let node = NonNull::from(Box::leak(Box::new(Self {
            key,
            balance: 0,
            children: [None, None],
            tag: Tag {
                count: 1,
                bounds: [NonNull::dangling(); 2],
            },
        })));

        // Safety: the node was just allocated and has no children.
        unsafe { Self::update(node) };

        node
    }

    /// Recomputes the tag of `node` from the tags of its two children.
    ///
    /// # Safety
    ///
    /// `node` and its children must be live nodes, and the tags of the children must be current.
    pub(crate) unsafe fn update(mut node: NonNull<Self>) {
        let mut count = 1;
        let mut bounds = [node; 2];

        // Safety: ensured by caller
        let this = unsafe { node.as_mut() };
        for side in Side::BOTH {
            if let Some(child) = this.children[side.index()] {
                // Safety: ensured by caller
                let child_tag = unsafe { &child.as_ref().tag };
                count += child_tag.count;
                bounds[side.index()] = child_tag.bounds[side.index()];
            }
        }

        this.tag = Tag { count, bounds };
    }

    /// Frees a node that has already been unlinked from its tree.
    ///
    /// # Safety
    ///
    /// `node` must have been allocated by [`Node::new_leaf`] and must not be referenced by any
    /// link anymore.
    pub(crate) unsafe fn free(node: NonNull<Self>) {
        // Safety: ensured by caller
        drop(unsafe { Box::from_raw(node.as_ptr()) });
    }

    #[inline]
    pub(crate) fn link(&self, side: Side) -> Link<T> {
        self.children[side.index()]
    }

    /// Returns the key stored in this node.
    pub fn key(&self) -> &T {
        &self.key
    }

    /// Returns the balance factor of this node, `height(right) - height(left)`.
    pub fn balance(&self) -> i8 {
        self.balance
    }

    /// Returns the child on the given side, if any.
    pub fn child(&self, side: Side) -> Option<&Node<T>> {
        // Safety: children are owned by this node and live at least as long as `self` is borrowed.
        self.link(side).map(|child| unsafe { child.as_ref() })
    }

    /// Returns an iterator over the existing children, left first.
    pub fn children(&self) -> impl Iterator<Item = &Node<T>> {
        Side::BOTH.into_iter().filter_map(|side| self.child(side))
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Returns the cached subtree aggregate of this node.
    pub fn tag(&self) -> &Tag<T> {
        &self.tag
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("balance", &self.balance)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl<T> Tag<T> {
    /// Returns the number of keys in the subtree.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the smallest key in the subtree.
    pub fn min(&self) -> &T {
        self.bound(Side::Left)
    }

    /// Returns the largest key in the subtree.
    pub fn max(&self) -> &T {
        self.bound(Side::Right)
    }

    /// Returns the key at the given extreme of the subtree.
    pub fn bound(&self, side: Side) -> &T {
        // Safety: bounds always point at nodes within the subtree that owns this tag, which
        // outlive any shared borrow of the tag.
        unsafe { &self.bounds[side.index()].as_ref().key }
    }

    #[inline]
    pub(crate) fn bound_node(&self, side: Side) -> NonNull<Node<T>> {
        self.bounds[side.index()]
    }
}

impl<T: fmt::Debug> fmt::Debug for Tag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("count", &self.count)
            .field("min", self.min())
            .field("max", self.max())
            .finish()
    }
}
