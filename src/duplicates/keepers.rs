//! Keeper selection and deletion planning.
//!
//! [`find_keepers`] picks, for every group ring, the one copy to retain and
//! flags it and all of its ancestors `keep`. [`count_list_delete`] then lists
//! every node whose content is guaranteed to survive in a kept copy
//! elsewhere.
//!
//! Rings with a master at or below a virtual node are left alone: a copy
//! inside an archive cannot be kept or deleted on its own.

use std::cmp::{Ordering, Reverse};

use serde::Serialize;

use crate::tree::{NodeId, Tree};

/// A node that can be deleted without losing content.
#[derive(Debug, Clone, Serialize)]
pub struct DeletionCandidate {
    #[serde(skip)]
    pub node: NodeId,
    pub path: String,
    pub size: u64,
    pub is_directory: bool,
    /// Whether the candidate is a subset of the kept copy
    pub is_slave: bool,
    /// Path of the kept copy that holds the same content
    pub kept: String,
}

/// Result of keeper selection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionPlan {
    /// Candidates, largest first
    pub candidates: Vec<DeletionCandidate>,
    /// Number of keepers selected
    pub keepers: usize,
}

impl DeletionPlan {
    /// Total bytes of all candidates.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.candidates.iter().map(|c| c.size).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

fn under_vnode(tree: &Tree, id: NodeId) -> bool {
    tree.node(id).vnode || tree.ancestors(id).any(|a| tree.node(a).vnode)
}

/// Levels up to the nearest `keep` ancestor, `usize::MAX` if there is none.
fn keep_distance(tree: &Tree, id: NodeId) -> usize {
    tree.ancestors(id)
        .position(|a| tree.node(a).keep)
        .unwrap_or(usize::MAX)
}

/// Total order used to break ties between equally good keepers.
fn cmp_keeper_order(tree: &Tree, a: NodeId, b: NodeId) -> Ordering {
    tree.parent_slave(a)
        .cmp(&tree.parent_slave(b))
        .then(tree.node(a).size.cmp(&tree.node(b).size))
        .then_with(|| tree.cmp_tree_order(a, b))
}

/// Select one keeper per group ring and flag it and its ancestors `keep`.
///
/// Rings are visited in pre-order so outer directories decide first. Among
/// the ring's non-slave, non-dupe members the smallest wins; ties go to the
/// member closest to an already kept ancestor, then to tree order.
///
/// Clears all previous `keep` flags and returns the number of keepers.
pub fn find_keepers(tree: &mut Tree) -> usize {
    tree.reset_keep();
    tree.reset_visited();
    let mut keepers = 0;

    for id in tree.pre_order() {
        let node = tree.node(id);
        if node.visited || node.group.is_none() || node.group == Some(id) {
            continue;
        }

        let ring: Vec<NodeId> = tree.ring(id).collect();
        for &m in &ring {
            tree.node_mut(m).visited = true;
        }

        if ring
            .iter()
            .any(|&m| !tree.node(m).slave && under_vnode(tree, m))
        {
            log::trace!("Skipping group of {} (virtual master)", tree.path(id));
            continue;
        }

        let keeper = ring
            .iter()
            .copied()
            .filter(|&m| {
                let n = tree.node(m);
                !n.slave && n.dupe.is_none()
            })
            .min_by(|&a, &b| {
                tree.node(a)
                    .size
                    .cmp(&tree.node(b).size)
                    .then_with(|| keep_distance(tree, a).cmp(&keep_distance(tree, b)))
                    .then_with(|| cmp_keeper_order(tree, a, b))
            });

        let Some(keeper) = keeper else {
            continue;
        };
        log::trace!("Keeping {}", tree.path(keeper));
        keepers += 1;
        tree.node_mut(keeper).keep = true;
        let ancestors: Vec<NodeId> = tree.ancestors(keeper).collect();
        for a in ancestors {
            tree.node_mut(a).keep = true;
        }
    }

    keepers
}

/// Whether `id` shares its ring with one of its own descendants.
fn holds_own_copy(tree: &Tree, id: NodeId) -> bool {
    tree.ring(id).skip(1).any(|m| tree.is_ancestor(id, m))
}

/// Whether some other member of `id`'s ring is a kept non-slave copy outside
/// `id`'s own lineage.
fn kept_elsewhere(tree: &Tree, id: NodeId) -> Option<NodeId> {
    tree.ring(id).skip(1).find(|&m| {
        let n = tree.node(m);
        n.keep && !n.slave && !tree.is_ancestor(m, id)
    })
}

/// List the nodes whose content survives in a kept copy, largest first.
///
/// Requires [`find_keepers`] to have run. Virtual subtrees are never listed.
/// A kept node that is grouped is retained whole, unless a copy from its own
/// ring lies below it; any other kept node is searched for candidates below
/// it.
#[must_use]
pub fn count_list_delete(tree: &Tree) -> Vec<DeletionCandidate> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(tree.root()).collect();
    stack.reverse();

    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        if node.vnode {
            continue;
        }
        let grouped = tree.is_grouped(id);

        let descend = if node.keep {
            !grouped || holds_own_copy(tree, id)
        } else if grouped {
            match kept_elsewhere(tree, id) {
                Some(kept) => {
                    out.push(DeletionCandidate {
                        node: id,
                        path: tree.path(id),
                        size: node.size,
                        is_directory: node.has_children(),
                        is_slave: node.slave,
                        kept: tree.path(kept),
                    });
                    false
                }
                None => true,
            }
        } else {
            true
        };

        if descend {
            let mark = stack.len();
            stack.extend(tree.children(id));
            stack[mark..].reverse();
        }
    }

    out.sort_by_key(|c| Reverse(c.size));
    out
}

/// Run [`find_keepers`] and [`count_list_delete`].
#[must_use]
pub fn plan_deletions(tree: &mut Tree) -> DeletionPlan {
    let keepers = find_keepers(tree);
    let candidates = count_list_delete(tree);
    log::debug!(
        "{} keepers, {} deletion candidates",
        keepers,
        candidates.len()
    );
    DeletionPlan {
        candidates,
        keepers,
    }
}
