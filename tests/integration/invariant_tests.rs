use finddup::duplicates::grouping::{group_dirs, group_tree};
use finddup::duplicates::{build_group_list, Role};
use finddup::scanner::{Ingestor, RecordFormat};
use finddup::tree::{Dupe, Tree};

/// A listing mixing mirrors, subsets, sibling copies and unique files.
fn mixed_listing() -> String {
    let mut lines = Vec::new();
    for (i, disk) in ["disk1", "disk2", "disk3"].iter().enumerate() {
        for album in 0..4 {
            for track in 0..3 {
                // disk3 lacks the last track of every album
                if i == 2 && track == 2 {
                    continue;
                }
                lines.push(format!(
                    "{album:02x}{track:02x}{} {} {disk}/music/album{album}/track{track}.flac",
                    "ab".repeat(14),
                    1000 * (album + 1) + track
                ));
            }
        }
        lines.push(format!("{:032x} {} {disk}/notes.txt", 0x1000 + i, 10 + i));
    }
    lines.push(format!("{} 7 loose/copy-a", "cd".repeat(16)));
    lines.push(format!("{} 7 loose/copy-b", "cd".repeat(16)));
    lines.join("\n")
}

fn ingest(listing: &str) -> Tree {
    let mut ingestor = Ingestor::new(RecordFormat::default()).unwrap();
    ingestor.ingest_reader(listing.as_bytes(), "mixed").unwrap();
    ingestor.finish().0
}

fn leaf_total(tree: &Tree) -> u64 {
    tree.ids()
        .filter(|&id| !tree.node(id).has_children() && id != tree.root())
        .map(|id| tree.node(id).size())
        .sum()
}

#[test]
fn test_grouping_reaches_fixpoint() {
    let mut tree = ingest(&mixed_listing());
    let stats = group_tree(&mut tree, false, None);

    assert!(stats.equal_passes >= 2);
    assert!(stats.master_slave_passes >= 1);
    assert!(!group_dirs(&mut tree, false));
}

#[test]
fn test_rings_stay_closed() {
    let mut tree = ingest(&mixed_listing());
    for id in tree.ids().collect::<Vec<_>>() {
        assert!(tree.ring_is_closed(id));
    }

    group_tree(&mut tree, false, None);
    for id in tree.ids() {
        assert!(tree.ring_is_closed(id), "ring through {} is broken", tree.path(id));
    }
}

#[test]
fn test_sizes_are_preserved() {
    let mut tree = ingest(&mixed_listing());
    let root = tree.root();
    let before = tree.node(root).size();
    assert_eq!(before, leaf_total(&tree));

    group_tree(&mut tree, false, None);
    assert_eq!(tree.node(root).size(), before);
    assert_eq!(leaf_total(&tree), before);
}

#[test]
fn test_sibling_dupes_share_parent() {
    let mut tree = ingest(&mixed_listing());
    group_tree(&mut tree, false, None);

    let mut seen = 0;
    for id in tree.ids() {
        if let Some(Dupe::Sibling(of)) = tree.node(id).dupe() {
            seen += 1;
            assert_ne!(of, id);
            assert_eq!(tree.node(of).parent(), tree.node(id).parent());
        }
    }
    assert!(seen >= 1);
}

#[test]
fn test_root_is_never_grouped() {
    let mut tree = ingest(&mixed_listing());
    group_tree(&mut tree, false, None);
    assert!(!tree.is_grouped(tree.root()));
}

#[test]
fn test_reported_groups_are_disjoint() {
    let mut tree = ingest(&mixed_listing());
    group_tree(&mut tree, false, None);
    let groups = build_group_list(&mut tree, true);

    let mut members: Vec<_> = groups
        .iter()
        .flat_map(|g| g.members.iter().map(|m| m.node))
        .collect();
    let total = members.len();
    members.sort();
    members.dedup();
    assert_eq!(members.len(), total);

    for group in &groups {
        assert!(group.len() >= 2);
        assert!(group.reclaimable <= group.total_size());
        assert_eq!(group.members[0].role, Role::Master);
    }
}

#[test]
fn test_subset_disk_is_slave() {
    let mut tree = ingest(&mixed_listing());
    group_tree(&mut tree, false, None);

    let music1 = tree.find("disk1/music").unwrap();
    let music3 = tree.find("disk3/music").unwrap();
    assert!(tree.ring(music1).any(|m| m == music3));
    assert!(tree.node(music3).is_slave());
    assert!(!tree.node(music1).is_slave());
}

#[test]
fn test_equal_only_never_marks_slaves() {
    let mut tree = ingest(&mixed_listing());
    let stats = group_tree(&mut tree, true, None);

    assert_eq!(stats.master_slave_passes, 0);
    assert!(tree.ids().all(|id| !tree.node(id).is_slave()));
}
