use core::ptr::NonNull;

use crate::{balance, child, parent, AvlTree, Dir, Link, Node};

impl<K: Ord> AvlTree<K> {
    /// Verifies every structural invariant of the tree.
    ///
    /// Checks, per node: BST ordering against the open key interval
    /// inherited from its ancestors, parent-pointer correctness, and that
    /// the stored balance factor equals the recomputed height difference and
    /// stays within ±1. Passes only if all of that holds at every node and
    /// the reachable node count equals [`len`](AvlTree::len).
    ///
    /// Read-only diagnostic; never repairs anything. Intended for tests.
    pub fn sanity(&self) -> bool {
        let mut count = 0;

        let ok = match self.root {
            Some(root) => unsafe { check(root, None, None, None, &mut count).is_some() },
            None => true,
        };

        ok && count == self.len()
    }
}

impl<K> AvlTree<K> {
    /// Returns the number of nodes on the longest root-to-leaf path.
    #[doc(hidden)]
    pub fn height(&self) -> usize {
        fn subtree_height<K>(link: Link<K>) -> usize {
            match link {
                Some(node) => unsafe {
                    1 + subtree_height(child(node, Dir::Left))
                        .max(subtree_height(child(node, Dir::Right)))
                },
                None => 0,
            }
        }

        subtree_height(self.root)
    }
}

// Validates the subtree rooted at `node` and returns its height, or `None`
// if any invariant is broken.
//
// Each node's key must lie strictly inside the open interval
// (`lower`, `upper`); a missing bound is unbounded. The node then narrows
// one side of the interval for each child. This holds uniformly for the
// root, single-node trees and every interior node, with no special cases.
unsafe fn check<K: Ord>(
    node: NonNull<Node<K>>,
    expected_parent: Link<K>,
    lower: Option<&K>,
    upper: Option<&K>,
    count: &mut usize,
) -> Option<usize> {
    unsafe {
        let key = &(*node.as_ptr()).key;

        if lower.is_some_and(|lo| key <= lo) || upper.is_some_and(|hi| key >= hi) {
            return None;
        }

        if parent(node) != expected_parent {
            return None;
        }

        *count += 1;

        let left = match child(node, Dir::Left) {
            Some(left) => check(left, Some(node), lower, Some(key), count)? as isize,
            None => -1,
        };
        let right = match child(node, Dir::Right) {
            Some(right) => check(right, Some(node), Some(key), upper, count)? as isize,
            None => -1,
        };

        let imbalance = right - left;
        if imbalance.abs() > 1 || imbalance != balance(node) as isize {
            return None;
        }

        Some((left.max(right) + 1) as usize)
    }
}
