use finddup::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use std::fs;
use tempfile::tempdir;

const HASH_A: &str = "0123456789abcdef0123456789abcdef";
const HASH_B: &str = "fedcba9876543210fedcba9876543210";

#[test]
fn test_listings_merge_in_order() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("disk1.md5");
    let second = dir.path().join("disk2.md5");
    fs::write(&first, format!("{HASH_A} 100 disk1/a\n{HASH_B} 7 disk1/b\n")).unwrap();
    fs::write(&second, format!("{HASH_A} 100 disk2/a\n{HASH_B} 7 disk2/b\n")).unwrap();

    let analysis = DuplicateFinder::with_defaults()
        .analyze_paths(&[first, second])
        .unwrap();

    assert_eq!(analysis.summary.sources, 2);
    assert_eq!(analysis.summary.records, 4);
    assert_eq!(analysis.groups.len(), 1);
    assert_eq!(analysis.groups[0].members[0].path, "disk1");
    assert_eq!(analysis.groups[0].members[1].path, "disk2");
}

#[test]
fn test_parse_errors_name_source_and_line() {
    let dir = tempdir().unwrap();
    let listing = dir.path().join("broken.md5");
    fs::write(
        &listing,
        format!("{HASH_A} 1 ok/one\ngarbage\n\n{HASH_A} 1 ok/two\n{HASH_B}\n"),
    )
    .unwrap();

    let analysis = DuplicateFinder::with_defaults()
        .analyze_paths(&[listing.clone()])
        .unwrap();

    let messages: Vec<String> = analysis.parse_errors.iter().map(ToString::to_string).collect();
    let origin = listing.display().to_string();
    assert_eq!(
        messages,
        vec![
            format!("{origin}:2: parse error"),
            format!("{origin}:3: parse error"),
            format!("{origin}:5: parse error"),
        ]
    );
    assert_eq!(analysis.summary.parse_errors, 3);
    assert_eq!(analysis.summary.records, 2);
    assert_eq!(analysis.groups.len(), 1);
}

#[test]
fn test_size_first_format() {
    let config = FinderConfig::default().with_format_str("s5").unwrap();
    let listing = format!("100 {HASH_A} a/x\n100 {HASH_A} b/x\n");
    let analysis = DuplicateFinder::new(config)
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();

    assert_eq!(analysis.summary.total_size, 200);
    assert_eq!(analysis.groups.len(), 1);
}

#[test]
fn test_ignored_columns() {
    let config = FinderConfig::default().with_format_str("5-s").unwrap();
    let listing = format!("{HASH_A} 2024-01-01 100 a/x\n{HASH_A} 2023-05-05 100 b/x\n");
    let analysis = DuplicateFinder::new(config)
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();

    assert_eq!(analysis.summary.total_size, 200);
    assert_eq!(analysis.groups[0].reclaimable, 100);
}

#[test]
fn test_paths_with_spaces() {
    let listing = format!("{HASH_A} 10 My Photos/img 1.jpg\n{HASH_A} 10 Backup Copy/img 1.jpg\n");
    let analysis = DuplicateFinder::with_defaults()
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();

    let paths: Vec<&str> = analysis.groups[0].members.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(paths, vec!["Backup Copy", "My Photos"]);
}

#[test]
fn test_crlf_line_endings() {
    let listing = format!("{HASH_A} 10 a/x\r\n{HASH_A} 10 b/x\r\n");
    let analysis = DuplicateFinder::with_defaults()
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();

    assert!(analysis.tree.find("a/x").is_some());
    assert!(analysis.parse_errors.is_empty());
    assert_eq!(analysis.groups.len(), 1);
}

#[test]
fn test_repeated_path_keeps_first_record() {
    let listing = format!("{HASH_A} 10 a/x\n{HASH_B} 99 a/x\n{HASH_A} 10 b/x\n");
    let analysis = DuplicateFinder::with_defaults()
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();

    assert_eq!(analysis.summary.total_size, 20);
    assert_eq!(analysis.summary.fingerprints, 1);
    assert_eq!(analysis.groups.len(), 1);
}

#[test]
fn test_unicode_normalization_merges_forms() {
    let nfc = "caf\u{e9}";
    let nfd = "cafe\u{301}";
    let listing = format!("{HASH_A} 5 {nfc}/menu\n{HASH_B} 6 {nfd}/wine\n");

    let plain = DuplicateFinder::with_defaults()
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();
    assert_eq!(plain.tree.children(plain.tree.root()).count(), 2);

    let normalized = DuplicateFinder::new(FinderConfig::default().with_normalize_unicode(true))
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();
    let tree = &normalized.tree;
    assert_eq!(tree.children(tree.root()).count(), 1);
    assert_eq!(tree.node(tree.find(nfc).unwrap()).size(), 11);
}

#[test]
fn test_virtual_marker_creates_vnode() {
    let listing = format!(
        "{HASH_A} 10 docs/a.txt\n{HASH_A} 10 backup.zip%%%%/docs/a.txt\n{HASH_B} 4 backup.zip\n"
    );
    let analysis = DuplicateFinder::with_defaults()
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();

    let tree = &analysis.tree;
    let zip = tree.find("backup.zip%%%%").unwrap();
    assert!(tree.node(zip).is_vnode());
    assert!(!tree.node(tree.find("backup.zip").unwrap()).is_vnode());
    assert!(analysis
        .groups
        .iter()
        .flat_map(|g| g.members.iter())
        .any(|m| m.is_virtual));
}

#[test]
fn test_missing_listing_reports_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.md5");
    let err = DuplicateFinder::with_defaults()
        .analyze_paths(&[missing.clone()])
        .unwrap_err();

    assert!(matches!(&err, FinderError::IoWithPath { path, .. } if *path == missing));
    assert!(err.to_string().contains("missing.md5"));
}

#[test]
fn test_invalid_format_rejected() {
    let err = FinderConfig::default().with_format_str("5sx").unwrap_err();
    assert!(err.to_string().contains('x'));
}

#[test]
fn test_non_hex_hash_is_not_grouped() {
    let listing = "NOT-A-HASH 10 a/x\nNOT-A-HASH 10 b/x\n";
    let analysis = DuplicateFinder::with_defaults()
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();

    assert_eq!(analysis.summary.records, 2);
    assert!(analysis.groups.is_empty());
}
