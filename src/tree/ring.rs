//! Group rings.
//!
//! Equivalent nodes are chained through their `group` link into a circle.
//! Two rings are merged, or one ring is split in two, by swapping the `group`
//! links of one member from each side ([`Tree::splice_groups`]). A node whose
//! `group` points at itself is a ring of one.

use super::{NodeId, Tree};

/// Iterator over the members of a group ring, starting at a given node.
#[derive(Debug, Clone)]
pub struct Ring<'a> {
    tree: &'a Tree,
    start: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Ring<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.node(cur).group.filter(|&n| n != self.start);
        Some(cur)
    }
}

impl Tree {
    /// Members of the ring through `id`, starting with `id`.
    ///
    /// An ungrouped node yields only itself.
    #[must_use]
    pub fn ring(&self, id: NodeId) -> Ring<'_> {
        Ring {
            tree: self,
            start: id,
            next: Some(id),
        }
    }

    /// Whether `id` shares its ring with at least one other node.
    #[must_use]
    pub fn is_grouped(&self, id: NodeId) -> bool {
        self.node(id).group.is_some_and(|g| g != id)
    }

    /// Swap the `group` links of `a` and `b`.
    ///
    /// Joins the two rings if they are distinct, splits the ring if both
    /// belong to the same one.
    pub(crate) fn splice_groups(&mut self, a: NodeId, b: NodeId) {
        let ga = self.node(a).group;
        let gb = self.node(b).group;
        self.node_mut(a).group = gb;
        self.node_mut(b).group = ga;
    }

    /// Mark every member of the ring through `id` as slave.
    pub(crate) fn enslave_group(&mut self, id: NodeId) {
        let members: Vec<NodeId> = self.ring(id).collect();
        for m in members {
            self.node_mut(m).slave = true;
        }
    }

    /// Whether `id` or any of its ancestors is a slave.
    #[must_use]
    pub fn parent_slave(&self, id: NodeId) -> bool {
        self.node(id).slave || self.ancestors(id).any(|a| self.node(a).slave)
    }

    /// Check that following `group` from `id` returns to `id` without
    /// revisiting any member.
    #[must_use]
    pub fn ring_is_closed(&self, id: NodeId) -> bool {
        let Some(mut cur) = self.node(id).group else {
            return true;
        };
        let mut seen = std::collections::HashSet::from([id]);
        while cur != id {
            if !seen.insert(cur) || seen.len() > self.len() {
                return false;
            }
            match self.node(cur).group {
                Some(next) => cur = next,
                None => return false,
            }
        }
        true
    }
}
