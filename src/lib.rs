//! An ordered set backed by an AVL tree with parent links.
//!
//! Every node stores a balance factor, `height(right) - height(left)`, which
//! stays in `{-1, 0, +1}` outside of rebalancing. Children are owned by their
//! parent slot; the parent pointer is a non-owning back-reference, so in-order
//! traversal needs no auxiliary stack.
//!
//! The mirrored left/right cases of the retrace and rotation logic are unified
//! by [`Dir`], whose sign (-1 for left, +1 for right) drives the balance
//! arithmetic. There is exactly one copy of each algorithm; divergence between
//! hand-written mirror branches is a classic source of subtle bugs.

use core::{borrow::Borrow, cmp::Ordering, fmt, ops::Not, ptr::NonNull};

mod container;
mod cursor;
mod debug;
mod iter;
#[cfg(any(test, feature = "model"))]
pub mod model;
mod sanity;
#[cfg(test)]
mod tests;

pub use container::Container;
pub use cursor::Cursor;
pub use iter::Iter;

/// A self-balancing binary search tree holding a set of ordered keys.
///
/// Insertion, removal and lookup complete in _O(log n)_ time. Duplicate keys
/// are rejected; "not found" and "duplicate" are ordinary outcomes, not
/// errors.
pub struct AvlTree<K> {
    pub(crate) root: Link<K>,
    len: usize,
}

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

impl Dir {
    /// The contribution of a child on this side to its parent's balance
    /// factor.
    #[inline]
    pub(crate) fn sign(self) -> i8 {
        match self {
            Dir::Left => -1,
            Dir::Right => 1,
        }
    }
}

pub(crate) struct Node<K> {
    parent: Link<K>,
    children: [Link<K>; 2],
    balance: i8,
    pub(crate) key: K,
}

pub(crate) type Link<K> = Option<NonNull<Node<K>>>;

impl<K> Node<K> {
    fn new(key: K, parent: Link<K>) -> NonNull<Node<K>> {
        Box::leak(Box::new(Node {
            parent,
            children: [None; 2],
            balance: 0,
            key,
        }))
        .into()
    }
}

impl<K> AvlTree<K> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<K> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the minimum key of the tree.
    pub fn first(&self) -> Option<&K> {
        self.root
            .map(|root| unsafe { &(*extremum(root, Dir::Left).as_ptr()).key })
    }

    /// Returns the maximum key of the tree.
    pub fn last(&self) -> Option<&K> {
        self.root
            .map(|root| unsafe { &(*extremum(root, Dir::Right).as_ptr()).key })
    }

    /// Removes and returns the minimum key of the tree.
    pub fn pop_first(&mut self) -> Option<K> {
        let node = self.root.map(|root| unsafe { extremum(root, Dir::Left) })?;
        Some(unsafe { self.remove_at(node) }.key)
    }

    /// Removes and returns the maximum key of the tree.
    pub fn pop_last(&mut self) -> Option<K> {
        let node = self.root.map(|root| unsafe { extremum(root, Dir::Right) })?;
        Some(unsafe { self.remove_at(node) }.key)
    }

    /// Returns an iterator over the keys of the tree, in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Returns a cursor at the minimum key, or at the past-end position if
    /// the tree is empty.
    pub fn cursor_first(&self) -> Cursor<'_, K> {
        Cursor::first(self)
    }

    /// Returns a cursor at the maximum key, or at the past-end position if
    /// the tree is empty.
    pub fn cursor_last(&self) -> Cursor<'_, K> {
        Cursor::last(self)
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node, elevate its right child (which
                // may be absent) and free it.
                let cur = extremum(cur, Dir::Left);
                let p = parent(cur);
                let right = child(cur, Dir::Right);

                self.replace_child(p, cur, right);
                if let Some(right) = right {
                    set_parent(right, p);
                }

                drop(Box::from_raw(cur.as_ptr()));
                self.len -= 1;

                // If the node had no right child, climb to the parent. If the
                // node had no parent, the tree is empty.
                opt_cur = right.or(p);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len, 0);
    }

    // Replaces the child pointer of `p` pointing at `old_child` with
    // `new_child`, or the root pointer if `p` is `None`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // `old_child` must be a child of `p`, or the root if `p` is `None`.
    unsafe fn replace_child(
        &mut self,
        p: Link<K>,
        old_child: NonNull<Node<K>>,
        new_child: Link<K>,
    ) {
        unsafe {
            match p {
                Some(p) => {
                    let dir = which_child(p, old_child);
                    set_child(p, dir, new_child);
                }
                None => self.root = new_child,
            }
        }
    }

    // Performs a single rotation at `a` toward `dir`, promoting `a`'s child
    // on the side opposite `dir` into `a`'s position.
    //
    //   dir == Right (clockwise):      dir == Left (counterclockwise):
    //
    //        P?            P?               P?            P?
    //        |             |                |             |
    //        A             B                A             B
    //       / \           / \              / \           / \
    //      B   C?  =>    D?  A            C?  B   =>    A   D?
    //     / \               / \              / \       / \
    //    D?  E?            E?  C?           E?  D?    C?  E?
    //
    // Pure pointer relinking; balance factors are left to the caller.
    unsafe fn rotate(&mut self, a: NonNull<Node<K>>, dir: Dir) {
        unsafe {
            let b = child(a, !dir).expect("rotation requires a child opposite its direction");
            let e = child(b, dir);
            let p = parent(a);

            set_child(a, !dir, e);
            set_parent(a, Some(b));

            set_child(b, dir, Some(a));
            set_parent(b, p);

            if let Some(e) = e {
                set_parent(e, Some(a));
            }
            self.replace_child(p, a, Some(b));
        }
    }

    // Performs a double rotation: `b`'s child `e` on the `dir` side is
    // promoted into the position of `a` (`b`'s parent).
    //
    //   dir == Right:
    //
    //        P?            P?              P?
    //        |             |               |
    //        A             A               E
    //       / \           / \            /   \
    //      B   C?  =>    E   C?   =>    B     A
    //     / \           / \            / \   / \
    //    D?  E         B   G?         D?  F?G?  C?
    //       / \       / \
    //      F?  G?    D?  F?
    //
    // Equivalent to rotate(b, !dir) followed by rotate(a, dir), but relinked
    // in one step and with all three balance factors recomputed from `e`'s
    // original balance, avoiding the intermediate inconsistent state.
    // Returns `e`.
    unsafe fn rotate_double(
        &mut self,
        b: NonNull<Node<K>>,
        a: NonNull<Node<K>>,
        dir: Dir,
    ) -> NonNull<Node<K>> {
        unsafe {
            let e = child(b, dir).expect("double rotation requires a pivot grandchild");
            let f = child(e, !dir);
            let g = child(e, dir);
            let p = parent(a);
            let e_balance = balance(e);

            set_child(a, !dir, g);
            set_parent(a, Some(e));
            set_balance(a, if dir.sign() * e_balance >= 0 { 0 } else { -e_balance });

            set_child(b, dir, f);
            set_parent(b, Some(e));
            set_balance(b, if dir.sign() * e_balance <= 0 { 0 } else { -e_balance });

            set_child(e, dir, Some(a));
            set_child(e, !dir, Some(b));
            set_parent(e, p);
            set_balance(e, 0);

            if let Some(g) = g {
                set_parent(g, Some(a));
            }
            if let Some(f) = f {
                set_parent(f, Some(b));
            }
            self.replace_child(p, a, Some(e));

            e
        }
    }

    // Handles the growth by 1 of the subtree rooted at `t`, the `dir` child
    // of `p`, after an insertion.
    //
    // Adjusts `p`'s balance factor and rotates if it reaches ±2. Returns
    // `true` if the whole tree is adequately balanced again, or `false` if
    // the subtree rooted at `p` is balanced but grew in height by 1, in
    // which case the caller continues up the tree.
    //
    // If `false` is returned, no rotation has been done; a single insertion
    // never requires more than one (single or double) rotation.
    unsafe fn handle_growth(&mut self, t: NonNull<Node<K>>, p: NonNull<Node<K>>, dir: Dir) -> bool {
        unsafe {
            let old_balance = balance(p);
            let new_balance = old_balance + dir.sign();

            if old_balance == 0 {
                // `p` now leans toward the insertion but holds the height
                // bound; it must have grown. Continue up.
                set_balance(p, new_balance);
                return false;
            }

            if new_balance == 0 {
                // `p` is now perfectly balanced; the growth was absorbed and
                // its height is unchanged.
                set_balance(p, 0);
                return true;
            }

            // `p` is now at ±2. `t` cannot be perfectly balanced here: it
            // grew, so it leans toward the inserted node.
            if dir.sign() * balance(t) > 0 {
                // `t` leans the same way `p` overbalanced: single rotation,
                // after which both are perfectly balanced.
                self.rotate(p, !dir);
                set_balance(p, 0);
                set_balance(t, 0);
            } else {
                self.rotate_double(t, p, !dir);
            }

            // The rotation restored the subtree's pre-insertion height.
            true
        }
    }

    // Retraces from the freshly inserted leaf `node` toward the root.
    unsafe fn retrace_grown(&mut self, node: NonNull<Node<K>>) {
        unsafe {
            let mut t = node;
            let Some(mut p) = parent(t) else { return };

            // The new leaf's parent held at most one child before, so it can
            // only move to 0 or ±1; no rotation happens at this level.
            adjust_balance(p, which_child(p, t).sign());
            if balance(p) == 0 {
                return;
            }

            loop {
                t = p;
                p = match parent(t) {
                    Some(p) => p,
                    None => return,
                };

                if self.handle_growth(t, p, which_child(p, t)) {
                    return;
                }
            }
        }
    }

    // Handles the shrink by 1 of `p`'s subtree on the `shrunk` side after a
    // removal.
    //
    // Adjusts `p`'s balance factor and rotates if it reaches ±2. Returns the
    // next (parent, shrunk side) pair to retrace if the subtree occupying
    // `p`'s old position decreased in height, or `None` if the tree is
    // adequately balanced again.
    //
    // Unlike insertion, this can cascade through every ancestor up to the
    // root, with up to _O(log n)_ rotations.
    unsafe fn handle_shrink(
        &mut self,
        p: NonNull<Node<K>>,
        shrunk: Dir,
    ) -> Option<(NonNull<Node<K>>, Dir)> {
        unsafe {
            let heavy = !shrunk;
            let old_balance = balance(p);
            let new_balance = old_balance + heavy.sign();

            let t = if old_balance == 0 {
                // `p` now leans away from the shrunken side; its height is
                // unchanged. Nothing more to do.
                set_balance(p, new_balance);
                return None;
            } else if new_balance == 0 {
                // `p` is now perfectly balanced, so it shrank. Continue up.
                set_balance(p, 0);
                p
            } else {
                // `p` is at ±2; `t` is its child on the surviving heavy side.
                let t = child(p, heavy).expect("a node at balance ±2 has a heavy child");

                if heavy.sign() * balance(t) >= 0 {
                    self.rotate(p, shrunk);

                    if balance(t) == 0 {
                        // `t` was perfectly balanced, a case that cannot
                        // occur on insertion. The rotation keeps `p` at its
                        // old lean and tips `t` the opposite way; the
                        // subtree height is unchanged, so retracing stops.
                        adjust_balance(t, shrunk.sign());
                        return None;
                    }

                    // `t` leaned toward the heavy side; both normalize and
                    // the subtree shrank by 1.
                    adjust_balance(p, shrunk.sign());
                    adjust_balance(t, shrunk.sign());
                    t
                } else {
                    // `t` leans opposite the imbalance; the double rotation
                    // shrinks the subtree by 1.
                    self.rotate_double(t, p, shrunk)
                }
            };

            // The subtree now rooted at `t` decreased in height by 1.
            let p = parent(t)?;
            Some((p, which_child(p, t)))
        }
    }

    // Swaps `node`, which must have two children, with its in-order
    // successor, then unlinks `node`.
    //
    // The successor physically takes over `node`'s position, parent, children
    // and balance factor, so references to surviving nodes stay valid.
    // Returns the parent of the position that lost a child, and the side
    // that shrank.
    unsafe fn swap_with_successor(&mut self, node: NonNull<Node<K>>) -> (NonNull<Node<K>>, Dir) {
        unsafe {
            let right = child(node, Dir::Right).expect("swap requires two children");
            let mut successor = right;

            let (hole_parent, shrunk) = if child(successor, Dir::Left).is_none() {
                // `node`'s right child is itself the successor; after the
                // relink below, its own right side is the one that lost
                // height.
                (successor, Dir::Right)
            } else {
                let mut q;
                loop {
                    q = successor;
                    successor = child(successor, Dir::Left).expect("descending a left spine");
                    if child(successor, Dir::Left).is_none() {
                        break;
                    }
                }

                // Unlink the successor from the bottom of the left spine and
                // hand it `node`'s right subtree.
                let successor_right = child(successor, Dir::Right);
                set_child(q, Dir::Left, successor_right);
                if let Some(sr) = successor_right {
                    set_parent(sr, Some(q));
                }

                set_child(successor, Dir::Right, Some(right));
                set_parent(right, Some(successor));

                (q, Dir::Left)
            };

            let left = child(node, Dir::Left).expect("swap requires two children");
            set_child(successor, Dir::Left, Some(left));
            set_parent(left, Some(successor));

            set_balance(successor, balance(node));
            let node_parent = parent(node);
            set_parent(successor, node_parent);
            self.replace_child(node_parent, node, Some(successor));

            (hole_parent, shrunk)
        }
    }

    // Unlinks `node` from the tree, retraces, and returns its storage.
    //
    // # Safety
    //
    // `node` must be an element of `self`, and not of any other tree.
    unsafe fn remove_at(&mut self, node: NonNull<Node<K>>) -> Box<Node<K>> {
        unsafe {
            let left = child(node, Dir::Left);
            let right = child(node, Dir::Right);

            let start = if left.is_some() && right.is_some() {
                Some(self.swap_with_successor(node))
            } else {
                // Splice the node out, reattaching its sole child (if any)
                // directly to its parent.
                let only = left.or(right);
                let p = parent(node);

                match p {
                    Some(p) => {
                        let dir = which_child(p, node);
                        set_child(p, dir, only);
                        if let Some(c) = only {
                            set_parent(c, Some(p));
                        }
                        Some((p, dir))
                    }
                    None => {
                        // Root with at most one child; no retrace needed.
                        if let Some(c) = only {
                            set_parent(c, None);
                        }
                        self.root = only;
                        None
                    }
                }
            };

            let mut cur = start;
            while let Some((p, shrunk)) = cur {
                cur = self.handle_shrink(p, shrunk);
            }

            self.len -= 1;
            Box::from_raw(node.as_ptr())
        }
    }
}

impl<K: Ord> AvlTree<K> {
    fn get_raw<Q>(&self, key: &Q) -> Link<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match key.cmp((*cur.as_ptr()).key.borrow()) {
                    Ordering::Less => opt_cur = child(cur, Dir::Left),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = child(cur, Dir::Right),
                }
            }
        }
    }

    /// Returns a reference to the key in the tree equal to `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).map(|node| unsafe { &(*node.as_ptr()).key })
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    /// Returns a cursor at `key`, or at the past-end position if `key` is
    /// not in the tree.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::at(self, self.get_raw(key))
    }

    /// Inserts `key` into the tree.
    ///
    /// Returns `true` if the key was inserted, or `false` if an equal key
    /// was already present, in which case the tree is unchanged.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K) -> bool {
        let Some(root) = self.root else {
            self.root = Some(Node::new(key, None));
            self.len = 1;
            return true;
        };

        // Descend to a vacant child slot.
        let mut cur = root;
        let node = loop {
            let dir = match key.cmp(unsafe { &(*cur.as_ptr()).key }) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return false,
                Ordering::Greater => Dir::Right,
            };

            match unsafe { child(cur, dir) } {
                Some(next) => cur = next,
                None => {
                    let node = Node::new(key, Some(cur));
                    unsafe { set_child(cur, dir, Some(node)) };
                    break node;
                }
            }
        };

        self.len += 1;
        unsafe { self.retrace_grown(node) };
        true
    }

    /// Removes `key` from the tree, returning the stored key.
    ///
    /// Returns `None` and leaves the tree unchanged if `key` is not present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(unsafe { self.remove_at(node) }.key)
    }
}

impl<K> Drop for AvlTree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K> Default for AvlTree<K> {
    fn default() -> AvlTree<K> {
        AvlTree::new()
    }
}

impl<K: Clone> Clone for AvlTree<K> {
    fn clone(&self) -> AvlTree<K> {
        AvlTree {
            root: self.root.map(|root| unsafe { clone_subtree(root, None) }),
            len: self.len,
        }
    }

    fn clone_from(&mut self, source: &AvlTree<K>) {
        // Release the previously owned subtree before copying the source.
        self.clear();
        self.root = source.root.map(|root| unsafe { clone_subtree(root, None) });
        self.len = source.len;
    }
}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'tree, K> IntoIterator for &'tree AvlTree<K> {
    type Item = &'tree K;
    type IntoIter = Iter<'tree, K>;

    fn into_iter(self) -> Iter<'tree, K> {
        self.iter()
    }
}

// Link plumbing =============================================================

#[inline]
pub(crate) unsafe fn child<K>(node: NonNull<Node<K>>, dir: Dir) -> Link<K> {
    unsafe { (*node.as_ptr()).children[dir as usize] }
}

#[inline]
unsafe fn set_child<K>(node: NonNull<Node<K>>, dir: Dir, link: Link<K>) {
    unsafe { (*node.as_ptr()).children[dir as usize] = link };
}

#[inline]
pub(crate) unsafe fn parent<K>(node: NonNull<Node<K>>) -> Link<K> {
    unsafe { (*node.as_ptr()).parent }
}

#[inline]
unsafe fn set_parent<K>(node: NonNull<Node<K>>, link: Link<K>) {
    unsafe { (*node.as_ptr()).parent = link };
}

#[inline]
pub(crate) unsafe fn balance<K>(node: NonNull<Node<K>>) -> i8 {
    unsafe { (*node.as_ptr()).balance }
}

#[inline]
unsafe fn set_balance<K>(node: NonNull<Node<K>>, balance: i8) {
    unsafe { (*node.as_ptr()).balance = balance };
}

#[inline]
unsafe fn adjust_balance<K>(node: NonNull<Node<K>>, delta: i8) {
    unsafe { (*node.as_ptr()).balance += delta };
}

#[inline]
pub(crate) unsafe fn which_child<K>(p: NonNull<Node<K>>, node: NonNull<Node<K>>) -> Dir {
    if unsafe { child(p, Dir::Left) } == Some(node) {
        Dir::Left
    } else {
        Dir::Right
    }
}

// Returns the extreme node of the subtree rooted at `node` on the `dir`
// side: its minimum for `Dir::Left`, its maximum for `Dir::Right`.
pub(crate) unsafe fn extremum<K>(node: NonNull<Node<K>>, dir: Dir) -> NonNull<Node<K>> {
    let mut cur = node;

    while let Some(next) = unsafe { child(cur, dir) } {
        cur = next;
    }

    cur
}

// Returns the in-order neighbor of `node` on the `dir` side: its successor
// for `Dir::Right`, its predecessor for `Dir::Left`.
//
// If `node` has a subtree on the `dir` side, the neighbor is that subtree's
// near extreme. Otherwise it is the first ancestor reached from a `!dir`
// child, or `None` past the last element.
pub(crate) unsafe fn step<K>(node: NonNull<Node<K>>, dir: Dir) -> Link<K> {
    unsafe {
        if let Some(subtree) = child(node, dir) {
            return Some(extremum(subtree, !dir));
        }

        let mut cur = node;
        while let Some(p) = parent(cur) {
            if which_child(p, cur) == !dir {
                return Some(p);
            }
            cur = p;
        }

        None
    }
}

unsafe fn clone_subtree<K: Clone>(node: NonNull<Node<K>>, parent: Link<K>) -> NonNull<Node<K>> {
    unsafe {
        let copy = Node::new((*node.as_ptr()).key.clone(), parent);
        (*copy.as_ptr()).balance = balance(node);
        (*copy.as_ptr()).children = [
            child(node, Dir::Left).map(|c| clone_subtree(c, Some(copy))),
            child(node, Dir::Right).map(|c| clone_subtree(c, Some(copy))),
        ];
        copy
    }
}
