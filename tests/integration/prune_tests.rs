use finddup::duplicates::{Analysis, DeletionPlan, DuplicateFinder};

const H1: &str = "11111111111111111111111111111111";
const H2: &str = "22222222222222222222222222222222";
const H3: &str = "33333333333333333333333333333333";
const H4: &str = "44444444444444444444444444444444";

fn analyze(listing: &str) -> Analysis {
    DuplicateFinder::with_defaults()
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap()
}

fn candidate_paths(plan: &DeletionPlan) -> Vec<&str> {
    plan.candidates.iter().map(|c| c.path.as_str()).collect()
}

#[test]
fn test_mirror_deletes_whole_directory() {
    let mut analysis = analyze(&format!("{H1} 10 a/x\n{H2} 5 a/y\n{H1} 10 b/x\n{H2} 5 b/y\n"));
    let plan = analysis.plan_deletions();

    assert_eq!(candidate_paths(&plan), vec!["b"]);
    assert_eq!(plan.total_bytes(), 15);
    let candidate = &plan.candidates[0];
    assert!(candidate.is_directory);
    assert!(!candidate.is_slave);
    assert_eq!(candidate.kept, "a");

    let tree = &analysis.tree;
    assert!(tree.node(tree.find("a").unwrap()).is_kept());
    assert!(!tree.node(tree.find("b").unwrap()).is_kept());
}

#[test]
fn test_slave_directory_is_deleted_in_favor_of_master() {
    let mut analysis = analyze(&format!(
        "{H1} 100 a/x\n{H2} 50 a/y\n{H3} 10 a/z\n{H1} 100 b/x\n{H2} 50 b/y\n"
    ));
    let plan = analysis.plan_deletions();

    assert_eq!(candidate_paths(&plan), vec!["b"]);
    assert!(plan.candidates[0].is_slave);
    assert_eq!(plan.candidates[0].kept, "a");
    assert_eq!(plan.total_bytes(), 150);
}

#[test]
fn test_sibling_copy_in_same_directory() {
    let mut analysis = analyze(&format!("{H1} 7 d/one\n{H1} 7 d/two\n{H2} 1 d/other\n"));
    let plan = analysis.plan_deletions();

    assert_eq!(candidate_paths(&plan), vec!["d/two"]);
    assert_eq!(plan.candidates[0].kept, "d/one");
    assert!(!plan.candidates[0].is_directory);
}

#[test]
fn test_shared_subdirectory_deleted_on_one_side() {
    let mut analysis = analyze(&format!(
        "{H1} 10 backup/2019/a\n{H2} 20 backup/2019/b\n{H3} 1 backup/misc\n\
         {H1} 10 photos/2019/a\n{H2} 20 photos/2019/b\n{H4} 2 photos/other\n"
    ));
    let plan = analysis.plan_deletions();

    assert_eq!(candidate_paths(&plan), vec!["photos/2019"]);
    assert_eq!(plan.candidates[0].kept, "backup/2019");
    assert_eq!(plan.total_bytes(), 30);

    // the unique files survive on both sides
    let tree = &analysis.tree;
    assert!(tree.node(tree.find("backup/2019/a").unwrap()).is_kept());
    assert!(!tree.node(tree.find("photos/other").unwrap()).is_kept());
}

#[test]
fn test_virtual_master_blocks_deletion() {
    let mut analysis = analyze(&format!(
        "{H1} 10 docs/a.txt\n{H1} 10 backup.zip%%%%/docs/a.txt\n"
    ));
    let plan = analysis.plan_deletions();

    assert!(plan.is_empty());
    assert_eq!(plan.keepers, 0);
}

#[test]
fn test_no_duplicates_means_empty_plan() {
    let mut analysis = analyze(&format!("{H1} 1 a\n{H2} 2 b\n{H3} 3 c/d\n"));
    assert!(!analysis.has_duplicates());

    let plan = analysis.plan_deletions();
    assert!(plan.is_empty());
    assert_eq!(plan.total_bytes(), 0);
}

#[test]
fn test_planning_twice_gives_same_result() {
    let mut analysis = analyze(&format!(
        "{H1} 10 f10\n{H1} 20 f20\n{H1} 30 f30\n{H2} 5 a/x\n{H2} 5 b/x\n"
    ));
    let first: Vec<String> = analysis
        .plan_deletions()
        .candidates
        .into_iter()
        .map(|c| c.path)
        .collect();
    let second: Vec<String> = analysis
        .plan_deletions()
        .candidates
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(first, second);
}
