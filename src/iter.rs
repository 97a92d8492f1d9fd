use core::iter::FusedIterator;

use crate::{node::Link, WavlTree};

/// An iterator over the entries of a [`WavlTree`], in ascending key order.
pub struct Iter<'tree, V> {
    tree: &'tree WavlTree<V>,

    front: Link,
    back: Link,

    len: usize,
}

impl<'tree, V> Iter<'tree, V> {
    pub(crate) fn new(tree: &'tree WavlTree<V>) -> Self {
        Iter {
            tree,

            front: tree.min,
            back: tree.max,
            len: tree.len(),
        }
    }
}

impl<'tree, V> Iterator for Iter<'tree, V> {
    type Item = (i64, &'tree V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.front?;
        self.front = self.tree.successor(cur);
        self.len -= 1;

        Some(self.tree.entry(cur))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'tree, V> DoubleEndedIterator for Iter<'tree, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.back?;
        self.back = self.tree.predecessor(cur);
        self.len -= 1;

        Some(self.tree.entry(cur))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> WavlTree<V> {
    /// Returns an iterator over the entries of the tree, in ascending key order.
    ///
    /// Iterating over the whole tree completes in _O(n)_ time.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self)
    }
}

impl<'tree, V> IntoIterator for &'tree WavlTree<V> {
    type Item = (i64, &'tree V);
    type IntoIter = Iter<'tree, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
