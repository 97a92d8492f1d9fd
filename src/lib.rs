//! An order-statistic map keyed by `i64`, built on a weak AVL tree, or WAVL tree.

// Conventions used in comments are from Haeupler, Sen and Tarjan:
// - The rank of a node `x` is denoted `r(x)`. The external node (a missing child) has rank -1.
// - The parent of a node `x` is denoted `p(x)`.
// - The rank difference of a node `x` is given by `r(p(x)) - r(x)`.
// - A node `x` is an `i`-child if its rank difference is `i`.
// - A node is `i,j` if one of its children is an `i`-child and the other is a `j`-child.
//
// The fundamental invariants of a WAVL tree are:
// 1. All rank differences are either 1 or 2.
// 2. All leaves have rank 0.
//
// In addition every node carries the size of its subtree, which is what makes `select` and
// `position_of` logarithmic:
// 3. `size(x) = 1 + size(left(x)) + size(right(x))`, with the external node having size 0.
//
// The tree also caches its minimum and maximum nodes. Every structural change keeps those two
// handles current; they are never recomputed by scanning.
//
// Nodes live in an arena and refer to each other by handle. Child links determine reachability;
// the parent link is navigational only.

use core::cmp::Ordering;

mod arena;
mod debug;
mod error;
mod iter;
mod node;
mod rebalance;
mod select;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

use crate::arena::{Arena, NodeId};
use crate::node::{Dir, Link, Node, EXTERNAL_RANK};

pub use crate::error::{Result, WavlError};
pub use crate::iter::Iter;
pub use crate::node::NodeRef;

/// An ordered map from distinct `i64` keys to values, with rank/select queries.
///
/// Implementation based on the paper [Rank-Balanced Trees] by Haeupler, Sen and Tarjan.
///
/// Lookups, insertions, deletions and `select` complete in _O(log(n))_ time. Mutating operations
/// report the number of rebalancing steps (promotions, demotions and rotations) they performed.
///
/// [Rank-Balanced Trees]: http://arks.princeton.edu/ark:/88435/pr1nz5z
pub struct WavlTree<V> {
    nodes: Arena<Node<V>>,
    root: Link,
    min: Link,
    max: Link,
}

impl<V> WavlTree<V> {
    /// Returns a new empty tree.
    pub const fn new() -> WavlTree<V> {
        WavlTree {
            nodes: Arena::new(),
            root: None,
            min: None,
            max: None,
        }
    }

    /// Returns a new empty tree with room for `capacity` entries before reallocating.
    pub fn with_capacity(capacity: usize) -> WavlTree<V> {
        WavlTree {
            nodes: Arena::with_capacity(capacity),
            root: None,
            min: None,
            max: None,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.root.is_none();

        debug_assert_eq!(empty, self.nodes.len() == 0);

        empty
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    /// Returns the value associated with `key`.
    pub fn get(&self, key: i64) -> Option<&V> {
        let node = self.find(key)?;
        Some(&self.node(node).value)
    }

    /// Returns a mutable reference to the value associated with `key`.
    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        let node = self.find(key)?;
        Some(&mut self.node_mut(node).value)
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains_key(&self, key: i64) -> bool {
        self.find(key).is_some()
    }

    /// Returns the value associated with the minimum key.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn min(&self) -> Option<&V> {
        self.min.map(|min| &self.node(min).value)
    }

    /// Returns the value associated with the maximum key.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn max(&self) -> Option<&V> {
        self.max.map(|max| &self.node(max).value)
    }

    /// Returns the entry with the minimum key.
    pub fn first_key_value(&self) -> Option<(i64, &V)> {
        self.min.map(|min| self.entry(min))
    }

    /// Returns the entry with the maximum key.
    pub fn last_key_value(&self) -> Option<(i64, &V)> {
        self.max.map(|max| self.entry(max))
    }

    /// Returns a read-only view of the root node, for inspecting the tree's shape.
    pub fn root(&self) -> Option<NodeRef<'_, V>> {
        self.root.map(|root| NodeRef::new(self, root))
    }

    /// Inserts `value` under `key`.
    ///
    /// Returns the number of rebalancing operations performed, or [`WavlError::DuplicateKey`] if
    /// `key` is already present, in which case the tree is unchanged.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: i64, value: V) -> Result<usize> {
        let parent = match self.locate(key) {
            Some(parent) => parent,
            None => {
                // Tree is empty. The new node is the root and both extremes.
                let node = self.nodes.alloc(Node::leaf(key, value));
                self.root = Some(node);
                self.min = Some(node);
                self.max = Some(node);
                return Ok(0);
            }
        };

        let dir = match key.cmp(&self.node(parent).key) {
            Ordering::Less => Dir::Left,
            Ordering::Equal => return Err(WavlError::DuplicateKey(key)),
            Ordering::Greater => Dir::Right,
        };

        let node = self.nodes.alloc(Node::leaf(key, value));
        self.set_child(parent, dir, Some(node));

        if self.min.map_or(true, |min| key < self.node(min).key) {
            self.min = Some(node);
        }
        if self.max.map_or(true, |max| key > self.node(max).key) {
            self.max = Some(node);
        }

        self.grow_path(parent);
        let ops = self.rebalance_after_insert(node);

        #[cfg(feature = "tracing")]
        tracing::debug!(key, ops, len = self.len(), "inserted");

        Ok(ops)
    }

    /// Deletes the entry for `key`.
    ///
    /// Returns the number of rebalancing operations performed, or [`WavlError::NotFound`] if
    /// `key` is absent, in which case the tree is unchanged.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn delete(&mut self, key: i64) -> Result<usize> {
        self.delete_entry(key).map(|(_, ops)| ops)
    }

    /// Removes the entry for `key`, returning its value.
    #[inline]
    pub fn remove(&mut self, key: i64) -> Option<V> {
        self.delete_entry(key).ok().map(|(value, _)| value)
    }

    /// Removes and returns the entry with the minimum key.
    pub fn pop_first(&mut self) -> Option<(i64, V)> {
        let key = self.node(self.min?).key;
        self.remove(key).map(|value| (key, value))
    }

    /// Removes and returns the entry with the maximum key.
    pub fn pop_last(&mut self) -> Option<(i64, V)> {
        let key = self.node(self.max?).key;
        self.remove(key).map(|value| (key, value))
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.min = None;
        self.max = None;
    }

    fn delete_entry(&mut self, key: i64) -> Result<(V, usize)> {
        let node = match self.locate(key) {
            Some(node) if self.node(node).key == key => node,
            _ => return Err(WavlError::NotFound(key)),
        };

        // There are three possible cases:
        //
        // 1. `node` has two children.
        //
        //    `node`'s successor, the least node of its right subtree, has no left child. It is
        //    spliced out of its position by elevating its right child, then relinked in `node`'s
        //    place, inheriting `node`'s rank, size and children.
        //
        // 2. `node` has one child, which is elevated into `node`'s place.
        //
        // 3. `node` is a leaf, and its slot becomes external.
        //
        // In every case the subtree rooted at the shrink point, the parent of the elevated link,
        // lost one node. Sizes are repaired from there to the root before rebalancing.

        let parent = self.parent(node);
        let left = self.node(node).left();
        let right = self.node(node).right();
        let slot = self.slot_of(node);

        if parent.is_none() && left.is_none() && right.is_none() {
            // `node` is the only element.
            let removed = self.nodes.take(node);
            self.root = None;
            self.min = None;
            self.max = None;
            return Ok((removed.value, 0));
        }

        if self.min == Some(node) {
            self.min = right.map(|right| self.min_in_subtree(right)).or(parent);
        }
        if self.max == Some(node) {
            self.max = left.map(|left| self.max_in_subtree(left)).or(parent);
        }

        let shrink = match (left, right) {
            (Some(left), Some(right)) => {
                let successor = self.min_in_subtree(right);
                let successor_parent = self
                    .parent(successor)
                    .expect("successor lies below the deleted node");
                let successor_dir = self.which_child(successor_parent, successor);
                let successor_right = self.node(successor).right();

                // Elevate the successor's right child to replace it.
                self.set_child(successor_parent, successor_dir, successor_right);

                // Put the successor where `node` was. The right link is re-read since it changed
                // above iff the successor was `node`'s right child.
                self.link_into(slot, Some(successor));
                let right = self.node(node).right();
                self.set_child(successor, Dir::Left, Some(left));
                self.set_child(successor, Dir::Right, right);

                let (rank, size) = (self.node(node).rank(), self.node(node).size());
                let successor_node = self.node_mut(successor);
                successor_node.set_rank(rank);
                successor_node.set_size(size);

                let shrink_point = if successor_parent == node {
                    successor
                } else {
                    successor_parent
                };
                Some((shrink_point, successor_dir))
            }

            (Some(child), None) | (None, Some(child)) => {
                self.link_into(slot, Some(child));
                slot
            }

            (None, None) => {
                self.link_into(slot, None);
                slot
            }
        };

        let removed = self.nodes.take(node);

        let ops = match shrink {
            Some((shrink_point, dir)) => {
                self.shrink_path(shrink_point);
                self.rebalance_after_delete(shrink_point, dir)
            }
            // The sole child was elevated to the root.
            None => 0,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(key, ops, len = self.len(), "deleted");

        Ok((removed.value, ops))
    }

    /// Returns the node holding `key`, or the last real node visited while searching for it.
    ///
    /// Returns `None` only if the tree is empty.
    fn locate(&self, key: i64) -> Link {
        let mut cur = self.root?;

        loop {
            let node = self.node(cur);
            let next = match key.cmp(&node.key) {
                Ordering::Less => node.left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => node.right(),
            };

            match next {
                Some(next) => cur = next,
                None => return Some(cur),
            }
        }
    }

    fn find(&self, key: i64) -> Link {
        self.locate(key).filter(|&node| self.node(node).key == key)
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert!(self.min.is_none() && self.max.is_none());
            assert_eq!(self.nodes.len(), 0);
            return;
        };

        assert_eq!(self.parent(root), None, "root must not have a parent");
        let size = self.assert_invariants_at(root, None, None);
        assert_eq!(size, self.nodes.len(), "unreachable nodes left in the arena");

        assert_eq!(self.min, Some(self.min_in_subtree(root)), "stale cached minimum");
        assert_eq!(self.max, Some(self.max_in_subtree(root)), "stale cached maximum");
    }

    // Checks the subtree at `node`, whose keys must lie strictly between `lo` and `hi`, and returns
    // its size.
    fn assert_invariants_at(&self, node: NodeId, lo: Option<i64>, hi: Option<i64>) -> usize {
        let n = self.node(node);

        if let Some(lo) = lo {
            assert!(n.key > lo, "key {} out of order", n.key);
        }
        if let Some(hi) = hi {
            assert!(n.key < hi, "key {} out of order", n.key);
        }

        // Ensure all leaves have rank 0.
        if n.is_leaf() {
            assert_eq!(n.rank(), 0, "leaf {} must have rank 0", n.key);
        }

        let mut size = 1;
        for dir in [Dir::Left, Dir::Right] {
            let child = n.child(dir);

            // Ensure all rank differences are 1 or 2.
            let rank_diff = n.rank() - self.rank(child);
            assert!(
                [1, 2].contains(&rank_diff),
                "node {} has a {rank_diff}-child",
                n.key
            );

            if let Some(child) = child {
                // Ensure child's parent link points to this node.
                assert_eq!(self.parent(child), Some(node), "broken parent link");

                size += match dir {
                    Dir::Left => self.assert_invariants_at(child, lo, Some(n.key)),
                    Dir::Right => self.assert_invariants_at(child, Some(n.key), hi),
                };
            }
        }

        assert_eq!(n.size(), size, "node {} has a stale size", n.key);
        size
    }

    // Support methods ========================================================

    #[inline]
    fn node(&self, id: NodeId) -> &Node<V> {
        self.nodes.get(id)
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        self.nodes.get_mut(id)
    }

    #[inline]
    fn entry(&self, id: NodeId) -> (i64, &V) {
        let node = self.node(id);
        (node.key, &node.value)
    }

    /// Returns the rank of the linked node.
    #[inline]
    fn rank(&self, link: Link) -> i8 {
        link.map_or(EXTERNAL_RANK, |node| self.node(node).rank())
    }

    /// Returns the subtree size of the linked node.
    #[inline]
    fn size(&self, link: Link) -> usize {
        link.map_or(0, |node| self.node(node).size())
    }

    #[inline]
    fn parent(&self, node: NodeId) -> Link {
        self.node(node).parent()
    }

    #[inline]
    fn child(&self, node: NodeId, dir: Dir) -> Link {
        self.node(node).child(dir)
    }

    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.child(parent, Dir::Left) == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                self.child(parent, Dir::Right),
                Some(child),
                "`child` must be a child of `parent`"
            );
            Dir::Right
        }
    }

    /// Returns the parent of `node` and the side `node` hangs from, or `None` for the root.
    fn slot_of(&self, node: NodeId) -> Option<(NodeId, Dir)> {
        let parent = self.parent(node)?;
        Some((parent, self.which_child(parent, node)))
    }

    // Sets the `dir` child of `parent` to `child`, and `child`'s parent link to `parent`.
    fn set_child(&mut self, parent: NodeId, dir: Dir, child: Link) {
        self.node_mut(parent).set_child(dir, child);

        if let Some(child) = child {
            self.node_mut(child).set_parent(Some(parent));
        }
    }

    // Links `child` into `slot`, or makes it the root if `slot` is `None`.
    fn link_into(&mut self, slot: Option<(NodeId, Dir)>, child: Link) {
        match slot {
            Some((parent, dir)) => self.set_child(parent, dir, child),
            None => {
                self.root = child;

                if let Some(child) = child {
                    self.node_mut(child).set_parent(None);
                }
            }
        }
    }

    // Recomputes the size of `node` from its children.
    fn update_size(&mut self, node: NodeId) {
        let n = self.node(node);
        let size = 1 + self.size(n.left()) + self.size(n.right());
        self.node_mut(node).set_size(size);
    }

    // Adds one to the size of every node from `node` to the root.
    fn grow_path(&mut self, node: NodeId) {
        let mut cur = Some(node);

        while let Some(node) = cur {
            let n = self.node_mut(node);
            n.set_size(n.size() + 1);
            cur = n.parent();
        }
    }

    // Subtracts one from the size of every node from `node` to the root.
    fn shrink_path(&mut self, node: NodeId) {
        let mut cur = Some(node);

        while let Some(node) = cur {
            let n = self.node_mut(node);
            n.set_size(n.size() - 1);
            cur = n.parent();
        }
    }
}

impl<V> Default for WavlTree<V> {
    fn default() -> Self {
        WavlTree::new()
    }
}

impl<V: core::fmt::Debug> core::fmt::Debug for WavlTree<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
