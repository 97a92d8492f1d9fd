use core::{fmt, mem, ops::Not};

use crate::{arena::NodeId, WavlTree};

/// A child or parent link. `None` is the external node: rank -1, size 0.
pub(crate) type Link = Option<NodeId>;

/// Rank of the external node.
pub(crate) const EXTERNAL_RANK: i8 = -1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

pub(crate) struct Node<V> {
    pub(crate) key: i64,
    pub(crate) value: V,
    rank: i8,
    size: usize,
    // Navigational only; the owning edges are `children`.
    parent: Link,
    children: [Link; 2],
}

impl<V> Node<V> {
    /// Returns a fresh leaf: rank 0, size 1, unlinked.
    pub(crate) fn leaf(key: i64, value: V) -> Node<V> {
        Node {
            key,
            value,
            rank: 0,
            size: 1,
            parent: None,
            children: [None; 2],
        }
    }

    #[inline]
    pub(crate) fn rank(&self) -> i8 {
        self.rank
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_rank(&mut self, rank: i8) {
        self.rank = rank;
    }

    #[inline]
    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    #[inline]
    pub(crate) fn promote(&mut self) {
        self.rank = self.rank.checked_add(1).expect("rank overflow");
    }

    #[inline]
    pub(crate) fn demote(&mut self) {
        self.rank = self.rank.checked_sub(1).expect("rank underflow");
    }
}

/// A read-only view of one node of a [`WavlTree`].
///
/// Exposes the node's rank and subtree size alongside its entry, for inspecting the shape of a
/// tree. The external node has no view: a missing child is `None`.
pub struct NodeRef<'tree, V> {
    tree: &'tree WavlTree<V>,
    id: NodeId,
}

impl<'tree, V> NodeRef<'tree, V> {
    pub(crate) fn new(tree: &'tree WavlTree<V>, id: NodeId) -> Self {
        NodeRef { tree, id }
    }

    fn node(&self) -> &'tree Node<V> {
        self.tree.node(self.id)
    }

    fn view(&self, link: Link) -> Option<NodeRef<'tree, V>> {
        link.map(|id| NodeRef::new(self.tree, id))
    }

    pub fn key(&self) -> i64 {
        self.node().key
    }

    pub fn value(&self) -> &'tree V {
        &self.node().value
    }

    pub fn rank(&self) -> i8 {
        self.node().rank()
    }

    /// Returns the number of nodes in the subtree rooted here, including this one.
    pub fn subtree_size(&self) -> usize {
        self.node().size()
    }

    pub fn left(&self) -> Option<NodeRef<'tree, V>> {
        self.view(self.node().left())
    }

    pub fn right(&self) -> Option<NodeRef<'tree, V>> {
        self.view(self.node().right())
    }

    pub fn parent(&self) -> Option<NodeRef<'tree, V>> {
        self.view(self.node().parent())
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }
}

impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<V> PartialEq for NodeRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<V: fmt::Debug> fmt::Debug for NodeRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.key())
            .field("value", self.value())
            .field("rank", &self.rank())
            .field("size", &self.subtree_size())
            .finish()
    }
}
