//! Duplicate group reporting.
//!
//! # Overview
//!
//! After grouping, every ring with more than one member describes nodes with
//! identical content. [`build_group_list`] turns those rings into
//! [`DuplicateGroup`]s:
//!
//! * a directory collapsed onto its only child is reported in place of that
//!   child, unless it also contains another copy from the same ring;
//! * a ring whose members all sit directly in directories of one other ring
//!   is implied by that parent group and is not reported, unless child groups
//!   are requested;
//! * each group carries its reclaimable size: the total size of its members
//!   minus the one master copy that would be kept.
//!
//! Groups are returned largest reclaimable size first.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::tree::{NodeId, Tree};

/// Whether a member holds the authoritative copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Complete copy of the group's content
    Master,
    /// Subset of a master's content
    Slave,
}

impl Role {
    /// Single-letter marker used in listings.
    #[must_use]
    pub fn marker(self) -> char {
        match self {
            Self::Master => 'M',
            Self::Slave => 'S',
        }
    }
}

/// One reported member of a duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    #[serde(skip)]
    pub node: NodeId,
    /// Full path, archive markers included
    pub path: String,
    pub size: u64,
    pub role: Role,
    /// Whether the member is a directory rather than a file
    pub is_directory: bool,
    /// Whether the member is inside an archive or other virtual container
    pub is_virtual: bool,
}

/// A set of files or directories with the same content.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Bytes freed by keeping one master copy and removing the rest
    pub reclaimable: u64,
    /// Members ordered masters first, then by size descending, then by path
    pub members: Vec<GroupMember>,
}

impl DuplicateGroup {
    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sum of all member sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.members.iter().map(|m| m.size).sum()
    }

    /// Whether the group has a master/slave split.
    #[must_use]
    pub fn has_slaves(&self) -> bool {
        self.members.iter().any(|m| m.role == Role::Slave)
    }

    /// Whether the members are directories.
    #[must_use]
    pub fn is_directory_group(&self) -> bool {
        self.members.iter().any(|m| m.is_directory)
    }

    pub fn masters(&self) -> impl Iterator<Item = &GroupMember> {
        self.members.iter().filter(|m| m.role == Role::Master)
    }

    pub fn slaves(&self) -> impl Iterator<Item = &GroupMember> {
        self.members.iter().filter(|m| m.role == Role::Slave)
    }
}

/// Collect the reportable duplicate groups of a grouped tree.
///
/// With `child_groups`, rings implied by a reported parent group are listed
/// as well. Uses the `visited` scratch flag.
#[must_use]
pub fn build_group_list(tree: &mut Tree, child_groups: bool) -> Vec<DuplicateGroup> {
    tree.reset_visited();
    let mut groups = Vec::new();

    for id in tree.post_order() {
        let node = tree.node(id);
        if node.visited || node.group.is_none() || node.group == Some(id) {
            continue;
        }

        let ring: Vec<NodeId> = tree.ring(id).collect();
        for &m in &ring {
            tree.node_mut(m).visited = true;
        }
        let members = resolve_collapses(tree, &ring);

        if !child_groups && implied_by_parent_group(tree, &members) {
            continue;
        }
        if members.len() < 2 {
            continue;
        }
        let members: Vec<NodeId> = members.into_iter().collect();
        groups.push(describe_group(tree, members));
    }

    groups.sort_by_key(|g| Reverse(g.reclaimable));
    log::debug!("Built {} duplicate groups", groups.len());
    groups
}

/// Reduce a ring to one node per collapse chain.
///
/// A directory collapsed onto its only child shares that child's ring, so a
/// ring can hold a whole chain `dir -> child -> grandchild`. Each chain is
/// represented by its outermost node that does not contain the innermost
/// node of another chain.
fn resolve_collapses(tree: &Tree, ring: &[NodeId]) -> BTreeSet<NodeId> {
    // chain top -> chain from its innermost member upwards
    let mut chains: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for &m in ring {
        let mut chain = vec![m];
        let mut cur = m;
        while tree.node(cur).is_parent_dupe() {
            match tree.node(cur).parent {
                Some(up) => {
                    cur = up;
                    chain.push(up);
                }
                None => break,
            }
        }
        let slot = chains.entry(cur).or_default();
        if chain.len() > slot.len() {
            *slot = chain;
        }
    }

    let innermost: Vec<NodeId> = chains.values().map(|c| c[0]).collect();
    chains
        .values()
        .map(|chain| {
            let own = chain[0];
            chain
                .iter()
                .rev()
                .copied()
                .find(|&n| {
                    !innermost
                        .iter()
                        .any(|&other| other != own && tree.is_ancestor(n, other))
                })
                .unwrap_or(own)
        })
        .collect()
}

/// Whether every non-dupe member's parent belongs to the ring of the first
/// such member's parent.
fn implied_by_parent_group(tree: &Tree, members: &BTreeSet<NodeId>) -> bool {
    let mut implied = false;
    let mut parent_ring: Option<HashSet<NodeId>> = None;

    for &m in members {
        let node = tree.node(m);
        if node.dupe.is_some() {
            continue;
        }
        implied = false;
        let Some(parent) = node.parent else {
            break;
        };
        if tree.node(parent).group.is_none() {
            break;
        }
        match &parent_ring {
            None => parent_ring = Some(tree.ring(parent).collect()),
            Some(ring) => {
                if !ring.contains(&parent) {
                    break;
                }
                implied = true;
            }
        }
    }
    implied
}

fn describe_group(tree: &Tree, mut members: Vec<NodeId>) -> DuplicateGroup {
    members.sort_by(|&a, &b| {
        let (na, nb) = (tree.node(a), tree.node(b));
        na.slave
            .cmp(&nb.slave)
            .then(nb.size.cmp(&na.size))
            .then_with(|| tree.cmp_tree_order(a, b))
    });

    let members: Vec<GroupMember> = members
        .into_iter()
        .map(|m| {
            let node = tree.node(m);
            GroupMember {
                node: m,
                path: tree.path(m),
                size: node.size,
                role: if node.slave { Role::Slave } else { Role::Master },
                is_directory: node.has_children(),
                is_virtual: node.vnode || tree.ancestors(m).any(|a| tree.node(a).vnode),
            }
        })
        .collect();

    let total: u64 = members.iter().map(|m| m.size).sum();
    let kept = members
        .iter()
        .filter(|m| m.role == Role::Master)
        .map(|m| m.size)
        .min()
        .or_else(|| members.iter().map(|m| m.size).min())
        .unwrap_or(0);

    DuplicateGroup {
        reclaimable: total.saturating_sub(kept),
        members,
    }
}
