use core::cmp::Ordering;

use crate::{arena::NodeId, node::Link, WavlTree};

impl<V> WavlTree<V> {
    /// Returns the value with the `i`th smallest key, counting from 1.
    ///
    /// Returns `None` if `i` is not in `1..=len()`.
    ///
    /// The search starts from whichever cached extreme is nearer, so this completes in
    /// _O(min(log(i), log(n - i)))_ time.
    pub fn select(&self, i: usize) -> Option<&V> {
        let node = self.select_node(i)?;
        Some(&self.node(node).value)
    }

    /// Returns the entry with the `i`th smallest key, counting from 1.
    pub fn select_key_value(&self, i: usize) -> Option<(i64, &V)> {
        self.select_node(i).map(|node| self.entry(node))
    }

    /// Returns the 1-based position of `key` in ascending key order.
    pub fn position_of(&self, key: i64) -> Option<usize> {
        let mut cur = self.root;
        let mut preceding = 0;

        while let Some(node) = cur {
            let n = self.node(node);

            match key.cmp(&n.key) {
                Ordering::Less => cur = n.left(),
                Ordering::Equal => return Some(preceding + self.size(n.left()) + 1),
                Ordering::Greater => {
                    preceding += self.size(n.left()) + 1;
                    cur = n.right();
                }
            }
        }

        None
    }

    fn select_node(&self, i: usize) -> Link {
        let len = self.len();
        if i == 0 || i > len {
            return None;
        }

        // Searching for the `j`th smallest key from the minimum, or the `j`th largest from the
        // maximum.
        let from_min = i <= len - i;
        let (mut cur, mut j) = if from_min {
            (self.min?, i)
        } else {
            (self.max?, len - i + 1)
        };

        // Climb to the first ancestor whose subtree holds the target.
        while self.node(cur).size() < j {
            cur = self.parent(cur)?;
        }

        if !from_min {
            // The `j`th largest key of this subtree is its `(size - j + 1)`th smallest.
            j = self.node(cur).size() - j + 1;
        }

        // Descend, tracking the position of `cur` within the subtree climbed to.
        let mut pos = self.size(self.node(cur).left()) + 1;
        while j != pos {
            if j < pos {
                cur = self.node(cur).left()?;
                pos -= self.size(self.node(cur).right()) + 1;
            } else {
                cur = self.node(cur).right()?;
                pos += self.size(self.node(cur).left()) + 1;
            }
        }

        Some(cur)
    }

    /// Returns the node with the next larger key.
    pub(crate) fn successor(&self, node: NodeId) -> Link {
        if let Some(right) = self.node(node).right() {
            return Some(self.min_in_subtree(right));
        }

        let mut cur = node;
        while let Some(parent) = self.parent(cur) {
            if self.node(parent).left() == Some(cur) {
                return Some(parent);
            }
            cur = parent;
        }

        None
    }

    /// Returns the node with the next smaller key.
    pub(crate) fn predecessor(&self, node: NodeId) -> Link {
        if let Some(left) = self.node(node).left() {
            return Some(self.max_in_subtree(left));
        }

        let mut cur = node;
        while let Some(parent) = self.parent(cur) {
            if self.node(parent).right() == Some(cur) {
                return Some(parent);
            }
            cur = parent;
        }

        None
    }

    // Returns the minimum node in the subtree.
    pub(crate) fn min_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;
        while let Some(left) = self.node(cur).left() {
            cur = left;
        }
        cur
    }

    // Returns the maximum node in the subtree.
    pub(crate) fn max_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;
        while let Some(right) = self.node(cur).right() {
            cur = right;
        }
        cur
    }

    /// Returns all keys in ascending order.
    pub fn keys_in_order(&self) -> Vec<i64> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Returns all values in ascending key order.
    pub fn values_in_order(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::WavlTree;

    fn squares(n: i64) -> WavlTree<i64> {
        let mut tree = WavlTree::new();
        // Scatter the insertion order so the shape is not a degenerate promote chain.
        for i in 0..n {
            let key = (i * 7) % n;
            tree.insert(key, key * key).unwrap();
        }
        tree.assert_invariants();
        tree
    }

    #[test]
    fn select_every_position() {
        let tree = squares(101);

        for i in 1..=101 {
            let key = i as i64 - 1;
            assert_eq!(tree.select(i), Some(&(key * key)), "select({i})");
            assert_eq!(tree.position_of(key), Some(i));
        }
    }

    #[test]
    fn select_out_of_range() {
        let tree = squares(10);
        assert_eq!(tree.select(0), None);
        assert_eq!(tree.select(11), None);
        assert_eq!(WavlTree::<()>::new().select(1), None);
        assert_eq!(tree.position_of(10), None);
    }

    #[test]
    fn successor_and_predecessor_walk() {
        let tree = squares(20);
        let first = tree.min.unwrap();
        let last = tree.max.unwrap();

        let mut cur = Some(first);
        let mut forward = Vec::new();
        while let Some(node) = cur {
            forward.push(tree.node(node).key);
            cur = tree.successor(node);
        }
        assert_eq!(forward, (0..20).collect::<Vec<_>>());

        let mut cur = Some(last);
        let mut backward = Vec::new();
        while let Some(node) = cur {
            backward.push(tree.node(node).key);
            cur = tree.predecessor(node);
        }
        assert_eq!(backward, (0..20).rev().collect::<Vec<_>>());
    }
}
