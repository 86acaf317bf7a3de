use std::ops::Range;

use proptest::prelude::*;

use crate::{model, AvlTree, Container};

fn tree_of(keys: &[u32]) -> AvlTree<u32> {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(key));
        assert!(tree.sanity());
    }

    tree
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        assert_eq!(tree.get(key), Some(key));
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    insert_find_all(&[0, 1, 2, 3]);
    insert_find_all(&[0, 1, 3, 2]);
    insert_find_all(&[0, 2, 1, 3]);
    insert_find_all(&[0, 2, 3, 1]);
    insert_find_all(&[0, 3, 1, 2]);
    insert_find_all(&[0, 3, 2, 1]);

    insert_find_all(&[1, 0, 2, 3]);
    insert_find_all(&[1, 0, 3, 2]);
    insert_find_all(&[1, 2, 0, 3]);
    insert_find_all(&[1, 2, 3, 0]);
    insert_find_all(&[1, 3, 0, 2]);
    insert_find_all(&[1, 3, 2, 0]);

    insert_find_all(&[2, 0, 1, 3]);
    insert_find_all(&[2, 0, 3, 1]);
    insert_find_all(&[2, 1, 0, 3]);
    insert_find_all(&[2, 1, 3, 0]);
    insert_find_all(&[2, 3, 0, 1]);
    insert_find_all(&[2, 3, 1, 0]);

    insert_find_all(&[3, 0, 1, 2]);
    insert_find_all(&[3, 0, 2, 1]);
    insert_find_all(&[3, 1, 0, 2]);
    insert_find_all(&[3, 1, 2, 0]);
    insert_find_all(&[3, 2, 0, 1]);
    insert_find_all(&[3, 2, 1, 0]);
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = tree_of(keys);

    for key in keys {
        assert_eq!(tree.remove(key), Some(*key));
        assert!(!tree.contains(key));
        assert!(tree.sanity());
    }

    assert!(tree.is_empty());

    for &key in keys {
        assert!(tree.insert(key));
        assert!(tree.sanity());
    }

    for key in keys.iter().rev() {
        assert_eq!(tree.remove(key), Some(*key));
        assert!(tree.sanity());
    }

    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    insert_remove_all(&[0, 1, 2, 3]);
    insert_remove_all(&[0, 1, 3, 2]);
    insert_remove_all(&[0, 2, 1, 3]);
    insert_remove_all(&[0, 2, 3, 1]);
    insert_remove_all(&[0, 3, 1, 2]);
    insert_remove_all(&[0, 3, 2, 1]);

    insert_remove_all(&[1, 0, 2, 3]);
    insert_remove_all(&[1, 0, 3, 2]);
    insert_remove_all(&[1, 2, 0, 3]);
    insert_remove_all(&[1, 2, 3, 0]);
    insert_remove_all(&[1, 3, 0, 2]);
    insert_remove_all(&[1, 3, 2, 0]);

    insert_remove_all(&[2, 0, 1, 3]);
    insert_remove_all(&[2, 0, 3, 1]);
    insert_remove_all(&[2, 1, 0, 3]);
    insert_remove_all(&[2, 1, 3, 0]);
    insert_remove_all(&[2, 3, 0, 1]);
    insert_remove_all(&[2, 3, 1, 0]);

    insert_remove_all(&[3, 0, 1, 2]);
    insert_remove_all(&[3, 0, 2, 1]);
    insert_remove_all(&[3, 1, 0, 2]);
    insert_remove_all(&[3, 1, 2, 0]);
    insert_remove_all(&[3, 2, 0, 1]);
    insert_remove_all(&[3, 2, 1, 0]);
}

#[test]
fn inorder_traversal_sorted() {
    let tree = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2, 6, 0]);

    let keys: Vec<u32> = tree.iter().copied().collect();
    assert_eq!(keys, (0..10).collect::<Vec<u32>>());
    assert_eq!(tree.len(), 10);
    assert!(tree.sanity());
}

#[test]
fn ascending_insert_stays_balanced() {
    let tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    // An unbalanced BST would degenerate to a 7-deep spine.
    assert!(tree.height() <= 4);
    assert_eq!(tree.iter().copied().collect::<Vec<u32>>(), vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn duplicate_insert_is_rejected() {
    let mut tree = tree_of(&[2, 1, 3]);

    assert!(!tree.insert(2));
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.iter().copied().collect::<Vec<u32>>(), vec![1, 2, 3]);
    assert!(tree.sanity());
}

#[test]
fn remove_absent_is_noop() {
    let mut tree = tree_of(&[2, 1, 3]);

    assert_eq!(tree.remove(&7), None);
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.iter().copied().collect::<Vec<u32>>(), vec![1, 2, 3]);
    assert!(tree.sanity());
}

#[test]
fn remove_until_empty() {
    let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2, 6, 0]);

    for key in 0..10 {
        assert_eq!(tree.remove(&key), Some(key));
        assert!(tree.sanity());
    }

    assert_eq!(tree.len(), 0);
    assert!(tree.sanity());

    // Further removals and clears are no-ops.
    assert_eq!(tree.remove(&0), None);
    tree.clear();
    assert!(tree.is_empty());
}

#[test]
fn first_last_pop() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    assert_eq!(tree.first(), Some(&1));
    assert_eq!(tree.last(), Some(&7));

    assert_eq!(tree.pop_first(), Some(1));
    assert_eq!(tree.pop_last(), Some(7));
    assert!(tree.sanity());
    assert_eq!(tree.len(), 5);

    tree.clear();
    assert_eq!(tree.first(), None);
    assert_eq!(tree.pop_first(), None);
    assert_eq!(tree.pop_last(), None);
}

#[test]
fn clone_is_independent() {
    let mut original = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2, 6, 0]);
    let copy = original.clone();

    // sanity() recomputes heights, so it also proves the copied balance
    // factors are the real ones.
    assert!(copy.sanity());
    assert_eq!(copy.len(), original.len());

    for key in 0..5 {
        original.remove(&key);
    }

    assert!(original.sanity());
    assert!(copy.sanity());
    assert_eq!(copy.len(), 10);
    assert_eq!(copy.iter().copied().collect::<Vec<u32>>(), (0..10).collect::<Vec<u32>>());
}

#[test]
fn clone_from_replaces_contents() {
    let source = tree_of(&[1, 2, 3]);
    let mut target = tree_of(&[10, 20, 30, 40]);

    target.clone_from(&source);

    assert_eq!(target.len(), 3);
    assert_eq!(target.iter().copied().collect::<Vec<u32>>(), vec![1, 2, 3]);
    assert!(target.sanity());
}

#[test]
fn iter_double_ended() {
    let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    let forward: Vec<u32> = tree.iter().copied().collect();
    let backward: Vec<u32> = tree.iter().rev().copied().collect();

    assert_eq!(forward, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(backward, vec![7, 6, 5, 4, 3, 2, 1]);

    let mut iter = tree.iter();
    assert_eq!(iter.len(), 7);
    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.next_back(), Some(&7));
    assert_eq!(iter.len(), 5);

    // Borrowed iteration via `for`.
    let mut total = 0;
    for key in &tree {
        total += key;
    }
    assert_eq!(total, 28);
}

#[test]
fn cursor_walks_and_wraps() {
    let tree = tree_of(&[2, 1, 3]);

    let mut curs = tree.cursor_first();
    assert_eq!(curs.get(), Some(&1));
    assert_eq!(curs.peek_prev(), None);
    assert_eq!(curs.peek_next(), Some(&2));

    curs.move_next();
    curs.move_next();
    assert_eq!(curs.get(), Some(&3));
    assert_eq!(curs, tree.cursor_last());

    // Stepping past the last element reaches the past-end position, and one
    // more step wraps to the first.
    curs.move_next();
    assert_eq!(curs.get(), None);
    curs.move_next();
    assert_eq!(curs.get(), Some(&1));
    assert_eq!(curs, tree.cursor_first());
}

#[test]
fn find_positions_cursor() {
    let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    let curs = tree.find(&5);
    assert_eq!(curs.get(), Some(&5));
    assert_eq!(curs.peek_next(), Some(&6));
    assert_eq!(curs.peek_prev(), Some(&4));

    let mut walked = tree.cursor_first();
    for _ in 0..4 {
        walked.move_next();
    }
    assert_eq!(walked, curs);

    // A missing key lands at the past-end position.
    let end = tree.find(&42);
    assert_eq!(end.get(), None);
    assert_eq!(end.peek_next(), Some(&1));
}

#[test]
fn empty_tree_cursors() {
    let tree: AvlTree<u32> = AvlTree::new();

    let mut curs = tree.cursor_first();
    assert_eq!(curs.get(), None);
    curs.move_next();
    assert_eq!(curs.get(), None);
    assert_eq!(curs, tree.cursor_last());
}

#[test]
fn container_surface() {
    fn drain<C: Container>(container: &mut C) -> usize {
        let len = container.len();
        container.clear();
        assert!(container.is_empty());
        len
    }

    let mut tree = tree_of(&[2, 1, 3]);

    let keys: Vec<u32> = Container::iter(&tree).copied().collect();
    assert_eq!(keys, vec![1, 2, 3]);

    assert_eq!(drain(&mut tree), 3);
    assert!(Container::iter(&tree).next().is_none());
}

#[test]
fn dotgraph_renders() {
    let tree = tree_of(&[2, 1, 3]);

    let mut out = String::new();
    tree.dotgraph("t", &mut out).unwrap();

    assert!(out.starts_with("digraph \"graph-t\""));
    assert!(out.contains("\"grapht-2\" [label=\"2:+0\"]"));
    assert!(out.contains("\"grapht-2\" -> \"grapht-1\";"));

    let empty: AvlTree<u32> = AvlTree::new();
    let mut out = String::new();
    empty.dotgraph("e", &mut out).unwrap();
    assert_eq!(out, "digraph \"graph-e\" {}");
}

#[test]
fn debug_format() {
    let tree = tree_of(&[2, 1, 3]);
    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        values in proptest::collection::vec(0u32..1000, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(values, ops);
    }
}
