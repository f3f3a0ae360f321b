use finddup::duplicates::{DuplicateFinder, FinderConfig, Role};
use finddup::index::EMPTY_HASH;

const HASH_A: &str = "0123456789abcdef0123456789abcdef";
const HASH_B: &str = "fedcba9876543210fedcba9876543210";
const HASH_C: &str = "00112233445566778899aabbccddeeff";

fn analyze(listing: &str) -> finddup::duplicates::Analysis {
    DuplicateFinder::with_defaults()
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap()
}

fn member_paths(analysis: &finddup::duplicates::Analysis, group: usize) -> Vec<&str> {
    analysis.groups[group]
        .members
        .iter()
        .map(|m| m.path.as_str())
        .collect()
}

#[test]
fn test_mirrored_directories_are_equal_peers() {
    let analysis = analyze(&format!("{HASH_A} 100 a/x\n{HASH_A} 100 b/x\n"));

    assert_eq!(analysis.groups.len(), 1);
    assert_eq!(member_paths(&analysis, 0), vec!["a", "b"]);
    assert_eq!(analysis.groups[0].reclaimable, 100);
    assert!(analysis.groups[0]
        .members
        .iter()
        .all(|m| m.role == Role::Master));

    let tree = &analysis.tree;
    let a = tree.find("a").unwrap();
    let b = tree.find("b").unwrap();
    assert!(tree.ring(a).any(|m| m == b));
    assert!(!tree.node(a).is_slave());
    assert!(!tree.node(b).is_slave());
}

#[test]
fn test_dropped_empty_file_does_not_break_equality() {
    let analysis = analyze(&format!(
        "{HASH_A} 100 a/x\n{HASH_A} 100 b/x\n{EMPTY_HASH} 0 a/y\n"
    ));

    assert!(analysis.tree.find("a/y").is_none());
    assert_eq!(analysis.summary.skipped_empty, 1);
    assert_eq!(analysis.groups.len(), 1);
    assert_eq!(member_paths(&analysis, 0), vec!["a", "b"]);
    assert!(!analysis.groups[0].has_slaves());
}

#[test]
fn test_included_empty_file_counts_as_child() {
    let config = FinderConfig::default().with_include_zero(true);
    let analysis = DuplicateFinder::new(config)
        .analyze_reader(
            format!("{HASH_A} 100 a/x\n{HASH_A} 100 b/x\n{EMPTY_HASH} 0 a/y\n").as_bytes(),
            "listing",
        )
        .unwrap();

    let tree = &analysis.tree;
    let a = tree.find("a").unwrap();
    assert!(tree.find("a/y").is_some());
    assert_eq!(tree.node(a).child_count(), 2);
    // a now holds more than b, so the two are no longer equal peers
    assert!(!tree.ring(a).any(|m| Some(m) == tree.find("b")));
}

#[test]
fn test_extra_file_makes_other_directory_a_copy_of_one_file() {
    let analysis = analyze(&format!(
        "{HASH_A} 100 a/x\n{HASH_A} 100 b/x\n{HASH_B} 50 a/y\n"
    ));

    let tree = &analysis.tree;
    let a = tree.find("a").unwrap();
    assert_eq!(tree.node(a).child_count(), 2);
    assert_eq!(tree.node(tree.find("b").unwrap()).child_count(), 0);

    // b holds nothing but a copy of a/x and is reported in its place
    assert_eq!(analysis.groups.len(), 1);
    assert_eq!(member_paths(&analysis, 0), vec!["a/x", "b"]);
    assert_eq!(analysis.groups[0].reclaimable, 100);
}

#[test]
fn test_subset_directory_becomes_slave() {
    let analysis = analyze(&format!(
        "{HASH_A} 100 a/x\n{HASH_B} 50 a/y\n{HASH_C} 10 a/z\n{HASH_A} 100 b/x\n{HASH_B} 50 b/y\n"
    ));

    assert_eq!(analysis.groups.len(), 1);
    let group = &analysis.groups[0];
    assert_eq!(member_paths(&analysis, 0), vec!["a", "b"]);
    assert_eq!(group.members[0].role, Role::Master);
    assert_eq!(group.members[1].role, Role::Slave);
    assert_eq!(group.reclaimable, 150);
    assert!(analysis.tree.node(analysis.tree.find("b").unwrap()).is_slave());
}

#[test]
fn test_equal_only_skips_master_slave() {
    let listing = format!(
        "{HASH_A} 100 a/x\n{HASH_B} 50 a/y\n{HASH_C} 10 a/z\n{HASH_A} 100 b/x\n{HASH_B} 50 b/y\n"
    );
    let analysis = DuplicateFinder::new(FinderConfig::default().with_equal_only(true))
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();

    assert_eq!(analysis.summary.grouping.master_slave_passes, 0);
    assert!(analysis.groups.iter().all(|g| !g.has_slaves()));
    // the file-level copies are still reported
    assert!(analysis
        .groups
        .iter()
        .any(|g| g.members.iter().any(|m| m.path == "a/x")));
}

#[test]
fn test_empty_record_never_inserted() {
    let analysis = analyze(&format!("{EMPTY_HASH} 0 lonely/empty.txt\n{HASH_A} 5 kept\n"));

    assert!(analysis.tree.find("lonely/empty.txt").is_none());
    assert!(analysis.tree.find("lonely").is_none());
    assert!(analysis.tree.find("kept").is_some());
    assert_eq!(analysis.summary.records, 1);
}

#[test]
fn test_smallest_copy_is_kept() {
    let mut analysis = analyze(&format!(
        "{HASH_A} 10 f10\n{HASH_A} 20 f20\n{HASH_A} 30 f30\n"
    ));
    assert_eq!(analysis.groups[0].reclaimable, 50);

    let plan = analysis.plan_deletions();
    assert_eq!(plan.keepers, 1);
    let paths: Vec<&str> = plan.candidates.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, vec!["f30", "f20"]);
    assert!(plan.candidates.iter().all(|c| c.kept == "f10"));
    assert!(analysis
        .tree
        .node(analysis.tree.find("f10").unwrap())
        .is_kept());
}

#[test]
fn test_nested_mirror_reports_outermost() {
    let analysis = analyze(&format!(
        "{HASH_A} 100 disk1/photos/2019/a.jpg\n{HASH_B} 200 disk1/photos/2019/b.jpg\n\
         {HASH_A} 100 disk2/photos/2019/a.jpg\n{HASH_B} 200 disk2/photos/2019/b.jpg\n"
    ));

    assert_eq!(analysis.groups.len(), 1);
    assert_eq!(member_paths(&analysis, 0), vec!["disk1", "disk2"]);
    assert_eq!(analysis.groups[0].reclaimable, 300);
}
