use crate::{arena::NodeId, node::Dir, WavlTree};

/// A repair step applied at `z`, the parent of a node `x` of equal rank, after an insertion.
///
/// Names follow the paper: `y` is `x`'s sibling and `b` is the child of `x` nearer `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum InsertCase {
    /// `z` is 0,1: promote `z` and continue from `z`.
    Promote,
    /// `z` is 0,2 and `b` is a 2-child: rotate `x` up and demote `z`.
    Rotate,
    /// `z` is 0,2 and `b` is a 1-child: rotate `b` up twice.
    DoubleRotate(NodeId),
}

/// A repair step applied at `z`, the parent of a 3-child `x`, after a deletion.
///
/// Names follow the paper: `y` is `x`'s sibling, `a` is the child of `y` nearer `x` and `b` is
/// the other child of `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DeleteCase {
    /// `y` is a 2-child: demote `z` and continue from `z`.
    Demote,
    /// `y` is a 2,2 1-child: demote `z` and `y` and continue from `z`.
    DoubleDemote(NodeId),
    /// `b` is a 1-child of `y`: rotate `y` up.
    Rotate(NodeId),
    /// `b` is a 2-child of `y`: rotate `a` up twice.
    DoubleRotate(NodeId, NodeId),
}

impl InsertCase {
    pub(crate) fn cost(self) -> usize {
        match self {
            InsertCase::Promote | InsertCase::Rotate => 1,
            InsertCase::DoubleRotate(_) => 2,
        }
    }
}

impl DeleteCase {
    pub(crate) fn cost(self) -> usize {
        match self {
            DeleteCase::Demote | DeleteCase::Rotate(_) => 1,
            DeleteCase::DoubleDemote(_) | DeleteCase::DoubleRotate(..) => 2,
        }
    }
}

impl<V> WavlTree<V> {
    // Performs a rotation, moving `x` up and its parent down.
    //
    // Subtree sizes of the two nodes are recomputed, child first. Ranks are not updated.
    pub(crate) fn rotate_up(&mut self, x: NodeId) {
        let y = self.parent(x).expect("cannot rotate the root");

        // - `y` becomes the `!dir` child of `x`.
        // - `across` goes from the `!dir` child of `x` to the `dir` child of `y`.
        let dir = self.which_child(y, x);
        let across = self.child(x, !dir);

        let slot = self.slot_of(y);
        self.link_into(slot, Some(x));
        self.set_child(y, dir, across);
        self.set_child(x, !dir, Some(y));

        self.update_size(y);
        self.update_size(x);
    }

    // Performs a double rotation, moving `x` up past its parent and then its grandparent.
    //
    // The ranks of affected nodes are not updated.
    pub(crate) fn double_rotate_up(&mut self, x: NodeId) {
        self.rotate_up(x);
        self.rotate_up(x);
    }

    // Performs a bottom-up rebalance of the tree after the insertion of the leaf `node`, returning
    // the number of rebalancing operations.
    pub(crate) fn rebalance_after_insert(&mut self, node: NodeId) -> usize {
        let mut ops = 0;
        let mut x = node;

        // The rank rule can only be violated by `x` being a 0-child.
        while let Some(z) = self.parent(x) {
            if self.rank(Some(z)) != self.rank(Some(x)) {
                break;
            }

            let dir = self.which_child(z, x);
            let case = self.insert_case(z, x, dir);
            ops += case.cost();

            #[cfg(feature = "tracing")]
            tracing::trace!(
                case = ?case,
                z = self.node(z).key,
                x = self.node(x).key,
                rank = self.node(z).rank(),
                "insert rebalance"
            );

            match case {
                InsertCase::Promote => {
                    self.node_mut(z).promote();
                    x = z;
                    continue;
                }

                InsertCase::Rotate => {
                    self.rotate_up(x);
                    self.node_mut(z).demote();
                }

                InsertCase::DoubleRotate(b) => {
                    self.double_rotate_up(b);
                    self.node_mut(x).demote();
                    self.node_mut(z).demote();
                    self.node_mut(b).promote();
                }
            }

            // A rotation always restores the rank rule.
            break;
        }

        ops
    }

    fn insert_case(&self, z: NodeId, x: NodeId, dir: Dir) -> InsertCase {
        let z_rank = self.rank(Some(z));
        let y = self.child(z, !dir);

        if z_rank - self.rank(y) == 1 {
            return InsertCase::Promote;
        }

        debug_assert_eq!(z_rank - self.rank(y), 2, "sibling of a 0-child must be a 2-child");

        match self.child(x, !dir) {
            Some(b) if z_rank - self.rank(Some(b)) == 1 => InsertCase::DoubleRotate(b),
            _ => InsertCase::Rotate,
        }
    }

    // Performs a bottom-up rebalance of the tree after a deletion shrank the `dir` subtree of
    // `parent`, returning the number of rebalancing operations.
    pub(crate) fn rebalance_after_delete(&mut self, parent: NodeId, dir: Dir) -> usize {
        let mut ops = 0;
        let (mut z, mut dir) = (parent, dir);

        // If `parent` lost its only child it is a 2,2 leaf. Demoting it makes it a leaf again, but
        // possibly a 3-child.
        if self.demote_if_2_2_leaf(z) {
            ops += 1;

            match self.slot_of(z) {
                Some((p, d)) => (z, dir) = (p, d),
                None => return ops,
            }
        }

        // The rank rule can only be violated by the `dir` child of `z` being a 3-child.
        while let Some(case) = self.delete_case(z, dir) {
            ops += case.cost();

            #[cfg(feature = "tracing")]
            tracing::trace!(
                case = ?case,
                z = self.node(z).key,
                rank = self.node(z).rank(),
                "delete rebalance"
            );

            match case {
                DeleteCase::Demote => {
                    self.node_mut(z).demote();
                }

                DeleteCase::DoubleDemote(y) => {
                    self.node_mut(z).demote();
                    self.node_mut(y).demote();
                }

                DeleteCase::Rotate(y) => {
                    self.rotate_up(y);
                    self.node_mut(y).promote();
                    self.node_mut(z).demote();
                    self.demote_if_2_2_leaf(z);
                    break;
                }

                DeleteCase::DoubleRotate(y, a) => {
                    self.double_rotate_up(a);
                    self.node_mut(y).demote();
                    self.node_mut(z).demote();
                    self.node_mut(z).demote();
                    self.node_mut(a).promote();
                    self.node_mut(a).promote();

                    debug_assert!(!self.is_2_2_leaf(y) && !self.is_2_2_leaf(z));
                    break;
                }
            }

            // Ascend one level. If this passes the root, the rank rule holds.
            match self.slot_of(z) {
                Some((p, d)) => (z, dir) = (p, d),
                None => break,
            }
        }

        ops
    }

    fn delete_case(&self, z: NodeId, dir: Dir) -> Option<DeleteCase> {
        let z_rank = self.rank(Some(z));

        if z_rank - self.rank(self.child(z, dir)) != 3 {
            return None;
        }

        let y = self
            .child(z, !dir)
            .expect("the sibling of a 3-child is never external");
        let y_rank = self.rank(Some(y));

        if z_rank - y_rank == 2 {
            return Some(DeleteCase::Demote);
        }

        let a = self.child(y, dir);
        let b = self.child(y, !dir);

        let case = if y_rank - self.rank(a) == 2 && y_rank - self.rank(b) == 2 {
            DeleteCase::DoubleDemote(y)
        } else if y_rank - self.rank(b) == 1 {
            DeleteCase::Rotate(y)
        } else {
            let a = a.expect("a 1-child is never external");
            DeleteCase::DoubleRotate(y, a)
        };

        Some(case)
    }

    fn is_2_2_leaf(&self, node: NodeId) -> bool {
        let n = self.node(node);
        n.is_leaf() && n.rank() > 0
    }

    // Demotes `node` if it is a leaf of positive rank, which can only be rank 1.
    fn demote_if_2_2_leaf(&mut self, node: NodeId) -> bool {
        if !self.is_2_2_leaf(node) {
            return false;
        }

        debug_assert_eq!(self.node(node).rank(), 1);

        #[cfg(feature = "tracing")]
        tracing::trace!(node = self.node(node).key, "demote 2,2 leaf");

        self.node_mut(node).demote();
        true
    }
}
