//! Binary exit status and output tests
//!
//! Run with: cargo test --test cli

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

const METADATA: &str = "\
source_tables,target_table,transformation_id
a b,c,t1
c,z,t2
b,c,t3
";

fn fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("metadata.csv");
    std::fs::write(&input, METADATA).unwrap();
    (dir, input)
}

fn lineage_trace(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lineage-trace"))
        .current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("LINEAGE_INPUT")
        .env_remove("LINEAGE_SHEET")
        .env_remove("LINEAGE_TARGET")
        .env_remove("LINEAGE_OUTPUT")
        .env_remove("LINEAGE_CONFIG")
        .env_remove("LINEAGE_NAMESPACE")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn json_summary() {
    let (dir, input) = fixture();
    let out = lineage_trace(
        &dir,
        &["-i", input.to_str().unwrap(), "-t", "z", "--format", "json", "-q"],
    );
    assert_eq!(out.status.code(), Some(0));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["ancestors"], serde_json::json!(["a", "b", "c"]));
    assert_eq!(
        report["paths"],
        serde_json::json!([["t1", "t2"], ["t3", "t2"]])
    );
    assert!(dir.path().join("lineage.json").exists());
}

#[test]
fn mermaid_to_stdout() {
    let (dir, input) = fixture();
    let out = lineage_trace(
        &dir,
        &["-i", input.to_str().unwrap(), "-t", "z", "-g", "mermaid", "-q"],
    );
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("flowchart LR"));
    assert!(stdout.contains("t3 -> t2"));
}

#[test]
fn exit_status_per_error_kind() {
    let (dir, input) = fixture();
    let input = input.to_str().unwrap();

    let unknown = lineage_trace(&dir, &["-i", input, "-t", "nowhere", "-q"]);
    assert_eq!(unknown.status.code(), Some(4));

    let limited = lineage_trace(&dir, &["-i", input, "-t", "z", "--max-paths", "1", "-q"]);
    assert_eq!(limited.status.code(), Some(5));

    let no_sheet = lineage_trace(
        &dir,
        &["-i", input, "-t", "z", "--input-type", "excel", "-q"],
    );
    assert_eq!(no_sheet.status.code(), Some(2));

    let missing_input = lineage_trace(&dir, &["-i", "absent.csv", "-t", "z", "-q"]);
    assert_eq!(missing_input.status.code(), Some(2));
}

#[test]
fn invalid_record_and_bad_sheet() {
    let (dir, _) = fixture();
    let broken = dir.path().join("broken.csv");
    std::fs::write(&broken, "source_tables,target_table,transformation_id\na,,t1\n").unwrap();
    let broken = broken.to_str().unwrap();

    let strict = lineage_trace(&dir, &["-i", broken, "-t", "a", "-q"]);
    assert_eq!(strict.status.code(), Some(3));

    let not_a_workbook = dir.path().join("fake.xlsx");
    std::fs::write(&not_a_workbook, "not a zip archive").unwrap();
    let excel = lineage_trace(
        &dir,
        &["-i", not_a_workbook.to_str().unwrap(), "-s", "meta", "-t", "z", "-q"],
    );
    assert_eq!(excel.status.code(), Some(6));
}

#[test]
fn json_errors_carry_exit_code() {
    let (dir, input) = fixture();
    let out = lineage_trace(
        &dir,
        &["-i", input.to_str().unwrap(), "-t", "nowhere", "--format", "json", "-q"],
    );
    assert_eq!(out.status.code(), Some(4));
    let body: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(body["exit_code"], 4);
    assert!(body["error"].as_str().unwrap().contains("nowhere"));
}
