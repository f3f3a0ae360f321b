//! Directory grouping engine.
//!
//! After ingestion every file node sits in the group ring of the files that
//! share its fingerprint. The passes here lift that equivalence to
//! directories:
//!
//! 1. [`ungroup_dirs`] takes nodes that have children out of any ring, so a
//!    path that was listed both as a file and as a directory is grouped only
//!    as a directory.
//! 2. [`find_dupes`] marks ring members that share a parent with an earlier
//!    member as sibling dupes.
//! 3. [`compute_child_counts`] counts, per directory, the children that are
//!    neither virtual nor dupes.
//! 4. [`group_dirs`] runs [`group_dir`] over the tree, children first, and is
//!    repeated until a pass changes nothing. The first fixpoint only accepts
//!    exact matches. Then [`kill_singles`] clears directories that stayed
//!    alone, and a second fixpoint also accepts subset matches, marking the
//!    smaller side as slave.
//!
//! [`group_tree`] runs the whole sequence.
//!
//! # Example
//!
//! ```
//! use finddup::duplicates::grouping::group_tree;
//! use finddup::scanner::{Ingestor, RecordFormat};
//!
//! let listing = "\
//! 11111111111111111111111111111111 10 a/x
//! 22222222222222222222222222222222 20 a/y
//! 11111111111111111111111111111111 10 b/x
//! 22222222222222222222222222222222 20 b/y
//! ";
//! let mut ingestor = Ingestor::new(RecordFormat::default()).unwrap();
//! ingestor.ingest_reader(listing.as_bytes(), "listing").unwrap();
//! let (mut tree, _) = ingestor.finish();
//!
//! group_tree(&mut tree, false, None);
//!
//! let a = tree.find("a").unwrap();
//! let b = tree.find("b").unwrap();
//! assert!(tree.ring(a).any(|n| n == b));
//! ```

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::progress::ProgressCallback;
use crate::tree::{Dupe, NodeId, Tree};

/// Per-candidate match tally built by [`group_dir`].
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    /// Children of the directory matched under this candidate
    count: u32,
    /// A matched child of the directory is a slave
    master: bool,
    /// A matched node on the candidate's side sits under a slave
    slave: bool,
}

/// Iteration counts of one [`group_tree`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Passes of the exact-match fixpoint, the final no-change pass included
    pub equal_passes: u32,
    /// Passes of the master/slave fixpoint, 0 when it was skipped
    pub master_slave_passes: u32,
    /// Directories that received a group
    pub directories_grouped: u64,
}

/// Remove every node that has children from the ring it belongs to.
///
/// Childless members keep their ring. A directory that carried a group is
/// left ungrouped.
pub fn ungroup_dirs(tree: &mut Tree) {
    for id in tree.post_order() {
        if !tree.node(id).has_children() {
            continue;
        }
        let Some(mut cur) = tree.node(id).group else {
            continue;
        };

        let mut last = id;
        while cur != id {
            if tree.node(cur).has_children() {
                let next = tree.node(cur).group;
                tree.node_mut(last).group = next;
                tree.node_mut(cur).group = None;
            } else {
                last = cur;
            }
            match tree.node(last).group {
                Some(next) => cur = next,
                None => break,
            }
        }

        let rest = tree.node(id).group;
        tree.node_mut(last).group = rest;
        tree.node_mut(id).group = None;
    }
}

/// Mark ring members that share a parent with an earlier member as sibling
/// dupes of that member.
///
/// Each ring is scanned four times: plain members first, then slaves, then
/// virtual nodes, then virtual slaves, so the member that stays canonical
/// under a parent is the most concrete one.
pub fn find_dupes(tree: &mut Tree) {
    for id in tree.post_order() {
        let node = tree.node(id);
        if node.visited || node.group.is_none() || node.group == Some(id) {
            continue;
        }

        let members: Vec<NodeId> = tree.ring(id).collect();
        let mut first_by_parent: HashMap<Option<NodeId>, NodeId> = HashMap::new();

        for pass in 0..4u8 {
            let with_slaves = pass & 1 != 0;
            let with_vnodes = pass & 2 != 0;
            for &m in &members {
                let n = tree.node(m);
                if n.visited || (!with_slaves && n.slave) || (!with_vnodes && n.vnode) {
                    continue;
                }
                match first_by_parent.entry(n.parent) {
                    Entry::Vacant(slot) => {
                        slot.insert(m);
                    }
                    Entry::Occupied(first) => {
                        tree.node_mut(m).dupe = Some(Dupe::Sibling(*first.get()));
                    }
                }
                tree.node_mut(m).visited = true;
            }
        }
    }
}

/// Set every node's `child_count` to its number of non-virtual, non-dupe
/// children.
pub fn compute_child_counts(tree: &mut Tree) {
    for id in tree.post_order() {
        let count = tree
            .children(id)
            .filter(|&c| {
                let n = tree.node(c);
                !n.vnode && n.dupe.is_none()
            })
            .count();
        tree.node_mut(id).child_count = u32::try_from(count).unwrap_or(u32::MAX);
    }
}

/// Clear the group of every directory that is alone in its ring.
pub fn kill_singles(tree: &mut Tree) {
    let ids: Vec<NodeId> = tree.ids().collect();
    for id in ids {
        let node = tree.node(id);
        if node.has_children() && node.group == Some(id) {
            tree.node_mut(id).group = None;
        }
    }
}

/// Try to group directory `id` with the directories holding copies of its
/// children.
///
/// Returns `false` without changes if `id` is the root, already has a
/// group, has no children, or has a non-virtual child that is not grouped
/// yet. Otherwise `id` receives a group (possibly just itself) and `true` is
/// returned.
///
/// With `equal_only`, only directories whose counted children match one to
/// one are merged. Otherwise a directory whose children are all found in a
/// larger one is merged too, and the smaller side is marked slave.
pub fn group_dir(tree: &mut Tree, id: NodeId, equal_only: bool) -> bool {
    if id == tree.root() {
        return false;
    }
    let d = tree.node(id);
    if d.group.is_some() || !d.has_children() {
        return false;
    }
    let children: Vec<NodeId> = tree.children(id).collect();
    if children.iter().any(|&c| {
        let n = tree.node(c);
        !n.vnode && n.group.is_none()
    }) {
        return false;
    }

    if tree.node(id).child_count == 1 {
        collapse_onto_child(tree, id, &children);
    } else {
        tree.node_mut(id).group = Some(id);
    }

    let mut tally = tally_candidates(tree, id, &children);
    let dcc = tree.node(id).child_count;
    let mut group_has_slaves = false;

    let keys: Vec<NodeId> = tally.keys().copied().collect();
    for x in keys {
        let Some(t) = tally.get(&x).copied() else {
            continue;
        };
        let xcc = tree.node(x).child_count;
        let mut master_node = false;
        let mut slave_node = false;

        if xcc == dcc && !t.master && !t.slave {
            if t.count != dcc {
                continue;
            }
        } else if xcc >= dcc && !t.slave {
            if equal_only || t.count != dcc || group_has_slaves {
                continue;
            }
            master_node = true;
        } else if xcc <= dcc && !t.master {
            if equal_only || t.count != xcc || tree.node(id).slave {
                continue;
            }
            slave_node = true;
        } else {
            continue;
        }

        let d_slave = tree.node(id).slave;
        if tree.node(x).group.is_some() {
            let ring: Vec<NodeId> = tree.ring(x).collect();
            let slave_group = ring.iter().any(|&m| tree.node(m).slave);
            for m in &ring[1..] {
                tally.remove(m);
            }
            if ring.contains(&id) {
                continue;
            }
            if !slave_group || !slave_node {
                if slave_node || d_slave {
                    tree.enslave_group(x);
                    group_has_slaves = true;
                } else if master_node {
                    tree.enslave_group(id);
                    group_has_slaves = true;
                } else if slave_group {
                    group_has_slaves = true;
                }
                tree.splice_groups(x, id);
            }
        } else {
            if slave_node || d_slave {
                tree.node_mut(x).slave = true;
                group_has_slaves = true;
            } else if master_node {
                tree.enslave_group(id);
                group_has_slaves = true;
            }
            let rest = tree.node(id).group;
            tree.node_mut(x).group = rest;
            tree.node_mut(id).group = Some(x);
        }
    }

    if tree.node(id).group.is_some_and(|g| g != id) {
        mark_ring_dupes(tree, id);
    }
    true
}

/// Give a directory with a single counted child that child's identity.
fn collapse_onto_child(tree: &mut Tree, id: NodeId, children: &[NodeId]) {
    let only = children.iter().copied().find(|&c| {
        let n = tree.node(c);
        n.dupe.is_none() && !n.vnode
    });
    let Some(c) = only else {
        tree.node_mut(id).group = Some(id);
        return;
    };

    let (slave, child_count, group) = {
        let n = tree.node(c);
        (n.slave, n.child_count, n.group)
    };
    let d = tree.node_mut(id);
    d.slave = slave;
    d.child_count = child_count;
    d.group = group;
    let n = tree.node_mut(c);
    n.dupe = Some(Dupe::Parent);
    n.group = Some(id);
}

/// Count, per candidate directory, how many of `id`'s children have a copy
/// directly under it.
fn tally_candidates(tree: &Tree, id: NodeId, children: &[NodeId]) -> BTreeMap<NodeId, Tally> {
    let mut tally: BTreeMap<NodeId, Tally> = BTreeMap::new();

    for &p in children {
        let pn = tree.node(p);
        if pn.vnode || pn.dupe.is_some() {
            continue;
        }
        let p_slave = pn.slave;

        for p2 in tree.ring(p).skip(1) {
            let n2 = tree.node(p2);
            if n2.vnode || n2.dupe.is_some() {
                continue;
            }
            let Some(mut cand) = n2.parent else {
                continue;
            };
            if cand == id {
                continue;
            }
            // A directory collapsed onto its only child speaks for it.
            while tree.node(cand).dupe == Some(Dupe::Parent) {
                match tree.node(cand).parent {
                    Some(up) => cand = up,
                    None => break,
                }
            }
            if cand == id || cand == tree.root() || tree.node(cand).dupe.is_some() {
                continue;
            }

            let entry = tally.entry(cand).or_default();
            entry.count += 1;
            if p_slave {
                entry.master = true;
            }
            if tree.parent_slave(p2) {
                entry.slave = true;
            }
        }
    }
    tally
}

/// Sibling dupe detection restricted to the ring through `id`.
///
/// Members are visited by exact class (plain, slave, virtual, virtual
/// slave). A member that becomes a dupe no longer counts towards its
/// parent's `child_count`.
fn mark_ring_dupes(tree: &mut Tree, id: NodeId) {
    let members: Vec<NodeId> = tree.ring(id).collect();
    let mut seen: HashMap<Option<NodeId>, NodeId> = HashMap::new();

    for pass in 0..4u8 {
        let want_slave = pass & 1 != 0;
        let want_vnode = pass & 2 != 0;
        for &m in &members {
            let (slave, vnode, dupe, parent) = {
                let n = tree.node(m);
                (n.slave, n.vnode, n.dupe, n.parent)
            };
            if slave != want_slave || vnode != want_vnode || dupe.is_some() {
                continue;
            }
            match seen.entry(parent) {
                Entry::Vacant(slot) => {
                    slot.insert(m);
                }
                Entry::Occupied(first) => {
                    tree.node_mut(m).dupe = Some(Dupe::Sibling(*first.get()));
                    if !vnode {
                        if let Some(p) = parent {
                            let count = &mut tree.node_mut(p).child_count;
                            *count = count.saturating_sub(1);
                        }
                    }
                }
            }
        }
    }
}

/// Run [`group_dir`] on every node, children before parents.
///
/// Returns whether any directory was grouped.
pub fn group_dirs(tree: &mut Tree, equal_only: bool) -> bool {
    let order = tree.post_order();
    group_dirs_in(tree, &order, equal_only) > 0
}

fn group_dirs_in(tree: &mut Tree, order: &[NodeId], equal_only: bool) -> u64 {
    let mut grouped = 0;
    for &id in order {
        if group_dir(tree, id, equal_only) {
            grouped += 1;
        }
    }
    grouped
}

/// Run every grouping pass on a freshly ingested tree.
///
/// With `equal_only` the master/slave fixpoint is skipped and only exact
/// directory matches are grouped.
pub fn group_tree(
    tree: &mut Tree,
    equal_only: bool,
    progress: Option<&dyn ProgressCallback>,
) -> GroupingStats {
    let mut stats = GroupingStats::default();

    log::info!("Ungrouping directories");
    ungroup_dirs(tree);
    log::info!("Finding dupes");
    find_dupes(tree);
    tree.reset_visited();
    log::info!("Counting children");
    compute_child_counts(tree);

    let order = tree.post_order();

    log::info!("Grouping directories (equal)");
    stats.equal_passes = run_fixpoint(tree, &order, true, &mut stats.directories_grouped, progress);

    if !equal_only {
        log::info!("Grouping directories (master/slave)");
        kill_singles(tree);
        stats.master_slave_passes =
            run_fixpoint(tree, &order, false, &mut stats.directories_grouped, progress);
    }

    stats
}

fn run_fixpoint(
    tree: &mut Tree,
    order: &[NodeId],
    equal_only: bool,
    grouped: &mut u64,
    progress: Option<&dyn ProgressCallback>,
) -> u32 {
    let mut passes = 0u32;
    loop {
        passes += 1;
        log::debug!("Grouping pass {passes} (equal_only={equal_only})");
        if let Some(p) = progress {
            p.on_message(&format!("pass {passes}"));
        }
        let n = group_dirs_in(tree, order, equal_only);
        *grouped += n;
        if n == 0 {
            return passes;
        }
    }
}
