use core::{iter::FusedIterator, marker::PhantomData};

use crate::{extremum, step, AvlTree, Dir, Link};

/// An iterator over the keys of an [`AvlTree`], in ascending order.
///
/// Stepping follows the node links only: into the right subtree's minimum
/// when one exists, otherwise up the parent chain to the first ancestor
/// entered from a left child. A full traversal is _O(n)_ overall; a single
/// step is _O(height)_ in the worst case.
pub struct Iter<'tree, K> {
    front: Link<K>,
    back: Link<K>,
    len: usize,
    _tree: PhantomData<&'tree AvlTree<K>>,
}

impl<'tree, K> Iter<'tree, K> {
    pub(crate) fn new(tree: &'tree AvlTree<K>) -> Self {
        Iter {
            front: tree.root.map(|root| unsafe { extremum(root, Dir::Left) }),
            back: tree.root.map(|root| unsafe { extremum(root, Dir::Right) }),
            len: tree.len(),
            _tree: PhantomData,
        }
    }
}

impl<'tree, K> Iterator for Iter<'tree, K> {
    type Item = &'tree K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.front?;
        self.front = unsafe { step(cur, Dir::Right) };
        self.len -= 1;

        Some(unsafe { &(*cur.as_ptr()).key })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K> DoubleEndedIterator for Iter<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.back?;
        self.back = unsafe { step(cur, Dir::Left) };
        self.len -= 1;

        Some(unsafe { &(*cur.as_ptr()).key })
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K> FusedIterator for Iter<'_, K> {}
