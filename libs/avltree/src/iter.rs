use crate::cursor::Cursor;
use crate::node::Node;
use crate::utils::Side;
use alloc::vec::Vec;
use core::iter::FusedIterator;

/// The order in which a [`Walk`] visits nodes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Order {
    /// Node, then its left subtree, then its right subtree.
    Pre,
    /// Left subtree, node, right subtree: ascending key order.
    In,
    /// Left subtree, right subtree, node.
    Post,
}

#[derive(Debug, Copy, Clone)]
enum Step {
    Explore(Side),
    Visit,
}

/// A lazy depth-first walk over the nodes of an [`AvlTree`](crate::AvlTree).
///
/// The walk keeps its own stack of pending steps instead of recursing, so its memory use is
/// bounded by three entries per level of the tree.
pub struct Walk<'a, T> {
    stack: Vec<(&'a Node<T>, Step)>,
    order: Order,
}

impl<'a, T> Walk<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>, order: Order) -> Self {
        let mut this = Self {
            stack: Vec::new(),
            order,
        };
        if let Some(root) = root {
            this.schedule(root);
        }
        this
    }

    /// Pushes the three steps for `node`, in reverse so they pop in `order`.
    fn schedule(&mut self, node: &'a Node<T>) {
        let steps = match self.order {
            Order::Pre => [
                Step::Explore(Side::Right),
                Step::Explore(Side::Left),
                Step::Visit,
            ],
            Order::In => [
                Step::Explore(Side::Right),
                Step::Visit,
                Step::Explore(Side::Left),
            ],
            Order::Post => [
                Step::Visit,
                Step::Explore(Side::Right),
                Step::Explore(Side::Left),
            ],
        };
        self.stack.extend(steps.map(|step| (node, step)));
    }
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, step)) = self.stack.pop() {
            match step {
                Step::Visit => return Some(node),
                Step::Explore(side) => {
                    if let Some(child) = node.child(side) {
                        self.schedule(child);
                    }
                }
            }
        }

        None
    }
}

impl<T> FusedIterator for Walk<'_, T> {}

/// An iterator over the keys of an [`AvlTree`](crate::AvlTree), in ascending order.
///
/// Created by [`AvlTree::iter`](crate::AvlTree::iter).
pub struct Iter<'a, T> {
    pub(crate) front: Cursor<'a, T>,
    pub(crate) back: Cursor<'a, T>,
    pub(crate) remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.front.get()?;
        self.front.move_next();
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.back.get()?;
        self.back.move_prev();
        self.remaining -= 1;
        Some(key)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}
