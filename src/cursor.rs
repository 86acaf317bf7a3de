use core::{fmt, ptr};

use crate::{extremum, step, AvlTree, Dir, Link};

/// A cursor over an [`AvlTree`].
///
/// A cursor points either to an element of the tree or to a past-end
/// position that connects the last element to the first. It is a plain
/// value: cheap to copy, comparable for equality, and tied to the tree by a
/// shared borrow, so the tree cannot be mutated while any cursor into it is
/// live.
pub struct Cursor<'tree, K> {
    tree: &'tree AvlTree<K>,
    ptr: Link<K>,
}

impl<'tree, K> Cursor<'tree, K> {
    pub(crate) fn first(tree: &'tree AvlTree<K>) -> Cursor<'tree, K> {
        Cursor {
            tree,
            ptr: tree.root.map(|root| unsafe { extremum(root, Dir::Left) }),
        }
    }

    pub(crate) fn last(tree: &'tree AvlTree<K>) -> Cursor<'tree, K> {
        Cursor {
            tree,
            ptr: tree.root.map(|root| unsafe { extremum(root, Dir::Right) }),
        }
    }

    pub(crate) fn at(tree: &'tree AvlTree<K>, ptr: Link<K>) -> Cursor<'tree, K> {
        Cursor { tree, ptr }
    }

    /// Moves the cursor to the next element in ascending order.
    ///
    /// If the cursor is at the past-end position, this method moves it to
    /// the first element. If it is at the last element, this method moves it
    /// to the past-end position.
    pub fn move_next(&mut self) {
        self.ptr = match self.ptr {
            Some(cur) => unsafe { step(cur, Dir::Right) },
            None => self.tree.root.map(|root| unsafe { extremum(root, Dir::Left) }),
        };
    }

    /// Moves the cursor to the previous element in ascending order.
    ///
    /// If the cursor is at the past-end position, this method moves it to
    /// the last element. If it is at the first element, this method moves it
    /// to the past-end position.
    pub fn move_prev(&mut self) {
        self.ptr = match self.ptr {
            Some(cur) => unsafe { step(cur, Dir::Left) },
            None => self.tree.root.map(|root| unsafe { extremum(root, Dir::Right) }),
        };
    }

    /// Returns a reference to the key the cursor points to.
    ///
    /// This returns `None` if the cursor is at the past-end position.
    pub fn get(&self) -> Option<&'tree K> {
        self.ptr.map(|cur| unsafe { &(*cur.as_ptr()).key })
    }

    /// Returns a reference to the next key.
    ///
    /// If the cursor is at the past-end position, this method returns the
    /// first key. If it is at the last element, this method returns `None`.
    pub fn peek_next(&self) -> Option<&'tree K> {
        let mut next = *self;
        next.move_next();
        next.get()
    }

    /// Returns a reference to the previous key.
    ///
    /// If the cursor is at the past-end position, this method returns the
    /// last key. If it is at the first element, this method returns `None`.
    pub fn peek_prev(&self) -> Option<&'tree K> {
        let mut prev = *self;
        prev.move_prev();
        prev.get()
    }
}

impl<K> Clone for Cursor<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Cursor<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for Cursor<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

impl<K> PartialEq for Cursor<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.ptr == other.ptr
    }
}

impl<K> Eq for Cursor<'_, K> {}
