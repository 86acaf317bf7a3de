use core::{fmt, ptr::NonNull};
use std::collections::VecDeque;

use crate::{balance, child, AvlTree, Dir, Node};

impl<K: fmt::Display> AvlTree<K> {
    /// Writes a Graphviz rendering of the tree to `w`, one `rank=same` row
    /// per depth level, labeling each node with its key and balance factor.
    pub fn dotgraph<W: fmt::Write>(&self, name: &str, mut w: W) -> fmt::Result {
        let root = match self.root {
            Some(root) => root,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<K> {
            Node(NonNull<Node<K>>),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        loop {
            use fmt::Write;
            let remaining = queue.len();
            if remaining == 0 {
                break;
            }

            write!(w, "{{rank=same; ")?;

            for _ in 0..remaining {
                let node = queue.pop_front().unwrap();

                let node = match node {
                    Item::Node(node) => node,
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let key = unsafe { &(*node.as_ptr()).key };
                let balance = unsafe { balance(node) };
                write!(w, "\"graph{name}-{key}\" [label=\"{key}:{balance:+}\"]; ")?;

                for dir in [Dir::Left, Dir::Right] {
                    if let Some(c) = unsafe { child(node, dir) } {
                        let child_key = unsafe { &(*c.as_ptr()).key };

                        queue.push_back(Item::Node(c));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                        )?;
                    } else {
                        queue.push_back(Item::Missing(missing));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                        )?;
                        missing += 1;
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}
