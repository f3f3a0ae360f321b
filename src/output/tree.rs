//! Dump of the grouped tree.
//!
//! One line per node, children indented below their parent:
//!
//! ```text
//! +- 200 1
//!   +-a 100 0 (G)
//!   | +-x 100 0* (G)
//!   +-b 100 0* (G)
//!     +-x 100 0* (G)
//! ```
//!
//! Each line carries the name, size and child count, then `*` for a dupe
//! and a ring marker: `(U)` for an ungrouped self ring, `(S)` for a slave and
//! `(G)` for any other grouped node.

use std::fmt;
use std::io::{self, Write};

use crate::tree::{NodeId, Tree};

/// Writer for the tree dump.
pub struct TreeDump<'a> {
    tree: &'a Tree,
}

impl<'a> TreeDump<'a> {
    #[must_use]
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }

    fn line(&self, id: NodeId) -> String {
        let tree = self.tree;
        let node = tree.node(id);
        let mut line = format!("+-{} {} {}", tree.name(id), node.size(), node.child_count());
        if node.dupe().is_some() {
            line.push('*');
        }
        if let Some(group) = node.group() {
            if tree.node(group).group() == Some(group) {
                line.push_str(" (U) ");
            } else if node.is_slave() {
                line.push_str(" (S) ");
            } else {
                line.push_str(" (G) ");
            }
        }
        line
    }

    /// Write the whole tree, root first.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{self}")
    }
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack: Vec<(NodeId, String)> = vec![(self.tree.root(), String::new())];
        while let Some((id, prefix)) = stack.pop() {
            writeln!(f, "{prefix}{}", self.line(id))?;
            let indent = if self.tree.node(id).sibling.is_some() {
                "| "
            } else {
                "  "
            };
            let child_prefix = format!("{prefix}{indent}");
            let mark = stack.len();
            stack.extend(self.tree.children(id).map(|c| (c, child_prefix.clone())));
            stack[mark..].reverse();
        }
        Ok(())
    }
}
