use core::cmp::Ordering;
use core::fmt;

/// Which child slot of a [`Node`](crate::Node) a link occupies.
///
/// `Left` holds the keys that compare less than the node, `Right` the keys that compare greater.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl Side {
    pub(crate) const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Index of this side in a node's child and bound arrays.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    /// The amount a node's balance factor moves when its subtree on this side grows by one level.
    #[inline]
    pub(crate) const fn weight(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }

    /// The side to descend into when searching for a key that compared `ord` against a node.
    ///
    /// Returns `None` for [`Ordering::Equal`], i.e. when the search is over.
    #[inline]
    pub(crate) fn from_ordering(ord: Ordering) -> Option<Side> {
        match ord {
            Ordering::Less => Some(Side::Left),
            Ordering::Equal => None,
            Ordering::Greater => Some(Side::Right),
        }
    }
}
