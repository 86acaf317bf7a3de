//! Command-driven test harness for the AVL tree.
//!
//! Starts with an empty tree and reads whitespace-separated commands from
//! stdin:
//!
//!   i <key>   insert key
//!   l <key>   print "Y" if key is present, "N" if it is not
//!   r <key>   remove key, if it exists
//!   s         print the tree size, i.e. the number of nodes
//!   c         clear the tree, removing all of its nodes
//!   p         print the tree's elements using in-order traversal
//!   v         print the result of the tree invariant check
//!
//! All keys are integer numbers. Unknown commands and malformed keys are
//! reported on stderr and skipped.

use std::io::{self, Read, Write};

use avltree::{AvlTree, Container};

fn print_all<C, W>(container: &C, mut out: W) -> io::Result<()>
where
    C: Container,
    C::Item: std::fmt::Display,
    W: Write,
{
    let mut sep = false;
    for item in container.iter() {
        if sep {
            write!(out, " ")?;
        }
        write!(out, "{item}")?;
        sep = true;
    }
    writeln!(out)
}

fn main() -> io::Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut tree: AvlTree<i64> = AvlTree::new();
    let mut tokens = input.split_ascii_whitespace();

    while let Some(op) = tokens.next() {
        // Operations taking a key consume the following token.
        let mut key = || -> Option<i64> {
            match tokens.next().map(str::parse) {
                Some(Ok(key)) => Some(key),
                Some(Err(_)) | None => {
                    eprintln!("Operation '{op}' needs an integer key");
                    None
                }
            }
        };

        match op {
            "i" => {
                if let Some(key) = key() {
                    tree.insert(key);
                }
            }
            "l" => {
                if let Some(key) = key() {
                    writeln!(out, "{}", if tree.contains(&key) { "Y" } else { "N" })?;
                }
            }
            "r" => {
                if let Some(key) = key() {
                    tree.remove(&key);
                }
            }
            "s" => writeln!(out, "{}", tree.len())?,
            "c" => tree.clear(),
            "p" => print_all(&tree, &mut out)?,
            "v" => {
                if tree.sanity() {
                    writeln!(out, "passed sanity check")?;
                } else {
                    writeln!(out, "failed sanity check")?;
                }
            }
            _ => eprintln!("Unknown operation: {op}"),
        }
    }

    Ok(())
}
