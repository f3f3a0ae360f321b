//! Traversal helpers for the sealed tree.

use std::cmp::Ordering;

use super::{NodeId, Tree};

/// Iterator over the children of a node, in sorted order.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.node(cur).sibling;
        Some(cur)
    }
}

/// Iterator over the strict ancestors of a node, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.node(cur).parent;
        Some(cur)
    }
}

impl Tree {
    /// Children of `id` in sorted order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.node(id).child,
        }
    }

    /// Strict ancestors of `id`, from the parent up to the root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).parent,
        }
    }

    /// Number of edges between `id` and the root.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Whether `ancestor` lies strictly above `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// All nodes, children before their parent. The root comes last.
    #[must_use]
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![(self.root(), false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            let mark = stack.len();
            stack.extend(self.children(id).map(|c| (c, false)));
            stack[mark..].reverse();
        }
        out
    }

    /// All nodes, parents before their children. The root comes first.
    #[must_use]
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mark = stack.len();
            stack.extend(self.children(id));
            stack[mark..].reverse();
        }
        out
    }

    /// Path from the root (exclusive) down to `id` (inclusive).
    #[must_use]
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain: Vec<NodeId> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|&n| n != self.root())
            .collect();
        chain.reverse();
        chain
    }

    /// Compare two nodes by their position in a pre-order walk.
    ///
    /// An ancestor sorts before its descendants; otherwise the children at
    /// the level where the two paths split are compared by name, then by
    /// vnode flag.
    #[must_use]
    pub fn cmp_tree_order(&self, a: NodeId, b: NodeId) -> Ordering {
        let la = self.lineage(a);
        let lb = self.lineage(b);
        match la.iter().zip(&lb).find(|(x, y)| x != y) {
            Some((&x, &y)) => self
                .name(x)
                .cmp(self.name(y))
                .then(self.node(x).vnode.cmp(&self.node(y).vnode)),
            None => la.len().cmp(&lb.len()),
        }
    }
}
