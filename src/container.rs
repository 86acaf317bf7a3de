use crate::{AvlTree, Iter};

/// The minimal capability surface of an ordered container: element count,
/// emptiness, wholesale clearing, and ascending borrowed iteration.
///
/// The iterator is an associated value type rather than a boxed
/// implementation object, so advancing and comparing positions involves no
/// heap allocation or dynamic dispatch.
pub trait Container {
    type Item;
    type Iter<'a>: Iterator<Item = &'a Self::Item>
    where
        Self: 'a;

    /// Returns the number of elements in the container.
    fn len(&self) -> usize;

    /// Returns `true` if the container holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all elements.
    fn clear(&mut self);

    /// Returns an iterator over the elements, in ascending order.
    fn iter(&self) -> Self::Iter<'_>;
}

impl<K> Container for AvlTree<K> {
    type Item = K;
    type Iter<'a>
        = Iter<'a, K>
    where
        K: 'a;

    fn len(&self) -> usize {
        AvlTree::len(self)
    }

    fn is_empty(&self) -> bool {
        AvlTree::is_empty(self)
    }

    fn clear(&mut self) {
        AvlTree::clear(self);
    }

    fn iter(&self) -> Iter<'_, K> {
        AvlTree::iter(self)
    }
}
