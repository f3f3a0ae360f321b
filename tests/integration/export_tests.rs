use finddup::duplicates::{Analysis, DuplicateFinder};
use finddup::error::ExitCode;
use finddup::output::json::{JsonDeletionOutput, JsonOutput};
use finddup::output::{csv, CsvOutput, ScriptOutput, ScriptType, TextOutput, TreeDump};

const LISTING: &str = "\
11111111111111111111111111111111 100 a/x
22222222222222222222222222222222 50 a/y
33333333333333333333333333333333 10 a/z
11111111111111111111111111111111 100 b/x
22222222222222222222222222222222 50 b/y
";

fn analyze() -> Analysis {
    DuplicateFinder::with_defaults()
        .analyze_reader(LISTING.as_bytes(), "listing")
        .unwrap()
}

fn render(f: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut buf = Vec::new();
    f(&mut buf);
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_text_group_listing() {
    let analysis = analyze();
    let text = render(|buf| {
        TextOutput::new(false)
            .write_groups(buf, &analysis.groups)
            .unwrap()
    });
    assert_eq!(text, "group size : 150 (150)\n M 160 a\n S 150 b\n\n");
}

#[test]
fn test_text_deletion_listing() {
    let mut analysis = analyze();
    let plan = analysis.plan_deletions();
    let text = render(|buf| TextOutput::new(false).write_deletions(buf, &plan).unwrap());
    assert_eq!(
        text,
        "delete size : 150 (150)\n b\n   = a\n\ntotal : 150 (150)\n"
    );
}

#[test]
fn test_json_groups_export() {
    let analysis = analyze();
    let code = ExitCode::for_outcome(analysis.has_duplicates(), analysis.summary.parse_errors);
    let json = JsonOutput::new(&analysis.groups, &analysis.summary, code)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["groups"][0]["reclaimable"], 150);
    assert_eq!(value["groups"][0]["members"][0]["path"], "a");
    assert_eq!(value["groups"][0]["members"][1]["role"], "slave");
    assert_eq!(value["groups"][0]["members"][1]["is_directory"], true);
    assert!(value["groups"][0]["members"][0].get("node").is_none());
    assert_eq!(value["summary"]["records"], 5);
    assert_eq!(value["summary"]["reclaimable_space"], 150);
    assert_eq!(value["summary"]["exit_code"], 0);
    assert_eq!(value["summary"]["exit_code_name"], "FD000");
}

#[test]
fn test_json_deletion_export() {
    let mut analysis = analyze();
    let plan = analysis.plan_deletions();
    let json = render(|buf| {
        JsonDeletionOutput::new(&plan, &analysis.summary, ExitCode::Success)
            .write_to(buf, false)
            .unwrap()
    });
    let value: serde_json::Value = serde_json::from_str(json.trim_end()).unwrap();

    assert_eq!(value["total_bytes"], 150);
    assert_eq!(value["candidates"][0]["path"], "b");
    assert_eq!(value["candidates"][0]["kept"], "a");
    assert_eq!(value["candidates"][0]["is_slave"], true);
}

#[test]
fn test_csv_exports() {
    let mut analysis = analyze();
    let groups = CsvOutput::new(&analysis.groups).to_string().unwrap();
    assert_eq!(
        groups,
        "group_id,reclaimable,role,size,path\n1,150,master,160,a\n1,150,slave,150,b\n"
    );

    let plan = analysis.plan_deletions();
    let deletions = render(|buf| csv::write_deletions(&plan, buf).unwrap());
    assert_eq!(
        deletions,
        "path,size,is_directory,is_slave,kept\nb,150,true,true,a\n"
    );
}

#[test]
fn test_script_exports() {
    let mut analysis = analyze();
    let plan = analysis.plan_deletions();

    let posix = render(|buf| {
        ScriptOutput::new(&plan, ScriptType::Posix)
            .write_to(buf)
            .unwrap()
    });
    assert!(posix.starts_with("#!/bin/sh\n"));
    assert!(posix.contains("rmdup d 'b'    # 150 bytes, subset, kept: 'a'\n"));
    assert!(posix.contains("# 1 candidates, "));

    let powershell = render(|buf| {
        ScriptOutput::new(&plan, ScriptType::PowerShell)
            .write_to(buf)
            .unwrap()
    });
    assert!(powershell.contains("Remove-Dup d 'b'    # 150 bytes, subset, kept: 'a'"));
}

#[test]
fn test_tree_dump_marks_groups() {
    let analysis = analyze();
    let dump = TreeDump::new(&analysis.tree).to_string();

    assert!(dump.starts_with("+- 310 "));
    assert!(dump.contains("+-a 160 "));
    assert!(dump.contains("+-b 150 "));
    assert!(dump.contains(" (S) "));
}
