use finddup::duplicates::grouping::{group_dirs, group_tree};
use finddup::duplicates::{DuplicateFinder, FinderConfig};
use finddup::output::to_human_str;
use finddup::scanner::{Ingestor, RecordFormat};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

/// (directory, subdirectory, file, content) picks for one listing line.
type Entry = (u8, u8, u8, u8);

fn entries() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec((0u8..3, 0u8..3, 0u8..4, 0u8..5), 0..40)
}

/// Listing text plus the first hash and size recorded for every path.
fn listing(entries: &[Entry]) -> (String, BTreeMap<String, (u8, u64)>) {
    let mut text = String::new();
    let mut files = BTreeMap::new();
    for &(d, s, f, h) in entries {
        let path = format!("d{d}/s{s}/f{f}");
        let size = (u64::from(h) + 1) * 10;
        text.push_str(&format!("{:032x} {size} {path}\n", u32::from(h) + 1));
        files.entry(path).or_insert((h, size));
    }
    (text, files)
}

fn under(path: &str, candidate: &str) -> bool {
    path == candidate
        || path
            .strip_prefix(candidate)
            .is_some_and(|rest| rest.starts_with('/'))
}

proptest! {
    #[test]
    fn test_grouping_invariants(entries in entries()) {
        let (text, files) = listing(&entries);
        let mut ingestor = Ingestor::new(RecordFormat::default()).unwrap();
        ingestor.ingest_reader(text.as_bytes(), "prop").unwrap();
        let (mut tree, stats) = ingestor.finish();

        // Invariant: repeated paths add nothing
        prop_assert_eq!(stats.records, entries.len() as u64);
        let expected: u64 = files.values().map(|&(_, size)| size).sum();
        prop_assert_eq!(tree.node(tree.root()).size(), expected);

        group_tree(&mut tree, false, None);

        // Invariant: the fixpoint is stable and sizes are untouched
        prop_assert!(!group_dirs(&mut tree, false));
        prop_assert_eq!(tree.node(tree.root()).size(), expected);
        prop_assert!(!tree.is_grouped(tree.root()));

        for id in tree.ids() {
            prop_assert!(tree.ring_is_closed(id));
        }
    }

    #[test]
    fn test_group_list_invariants(entries in entries()) {
        let (text, _) = listing(&entries);
        let analysis = DuplicateFinder::new(FinderConfig::default().with_child_groups(true))
            .analyze_reader(text.as_bytes(), "prop")
            .unwrap();

        let mut seen = HashSet::new();
        for group in &analysis.groups {
            // Invariant: a group has at least two members and keeps one copy
            prop_assert!(group.len() >= 2);
            prop_assert!(group.reclaimable < group.total_size());
            for member in &group.members {
                prop_assert!(seen.insert(member.node));
            }
        }
        prop_assert_eq!(analysis.summary.duplicate_groups, analysis.groups.len());
        let reclaimable: u64 = analysis.groups.iter().map(|g| g.reclaimable).sum();
        prop_assert_eq!(analysis.summary.reclaimable_space, reclaimable);
    }

    #[test]
    fn test_deletion_plan_structure(entries in entries()) {
        let (text, _) = listing(&entries);
        let mut analysis = DuplicateFinder::with_defaults()
            .analyze_reader(text.as_bytes(), "prop")
            .unwrap();
        let plan = analysis.plan_deletions();
        let tree = &analysis.tree;

        for (i, candidate) in plan.candidates.iter().enumerate() {
            // Invariant: the kept copy exists, is kept and lies outside the candidate
            let kept = tree.find(&candidate.kept).unwrap();
            prop_assert!(tree.node(kept).is_kept());
            prop_assert!(!tree.node(candidate.node).is_kept());
            prop_assert!(!under(&candidate.kept, &candidate.path));
            prop_assert!(!under(&candidate.path, &candidate.kept));

            // Invariant: candidates never nest
            for other in &plan.candidates[i + 1..] {
                prop_assert!(!under(&other.path, &candidate.path));
                prop_assert!(!under(&candidate.path, &other.path));
            }
        }

        // Invariant: largest first
        for pair in plan.candidates.windows(2) {
            prop_assert!(pair[0].size >= pair[1].size);
        }
    }

    #[test]
    fn test_exact_deletions_keep_every_content(entries in entries()) {
        let (text, files) = listing(&entries);
        let mut analysis = DuplicateFinder::new(FinderConfig::default().with_equal_only(true))
            .analyze_reader(text.as_bytes(), "prop")
            .unwrap();
        let plan = analysis.plan_deletions();

        // Invariant: every content listed survives outside the deleted subtrees
        let surviving: HashSet<u8> = files
            .iter()
            .filter(|(path, _)| !plan.candidates.iter().any(|c| under(path, &c.path)))
            .map(|(_, &(h, _))| h)
            .collect();
        let listed: HashSet<u8> = files.values().map(|&(h, _)| h).collect();
        prop_assert_eq!(surviving, listed);
    }

    #[test]
    fn test_human_sizes_are_short(bytes in any::<u64>()) {
        let text = to_human_str(bytes);
        prop_assert!(text.len() <= 5);
        prop_assert!(!text.is_empty());
    }
}
