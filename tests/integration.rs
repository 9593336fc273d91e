//! Integration tests for the merlint library and CLI

use merlint::codes::*;
use merlint::{Config, Engine, FixLevel, FixMode, Fixer};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn fixtures(dir: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(dir)
}

fn fixture(path: &str) -> String {
    fs::read_to_string(fixtures(path)).unwrap()
}

fn sorted_codes(engine: &Engine, path: &str) -> Vec<String> {
    let report = engine.lint_text(&fixture(path), Path::new(path));
    let mut codes: Vec<String> = report.diagnostics.into_iter().filter_map(|d| d.code).collect();
    codes.sort();
    codes
}

fn merlint() -> Command {
    Command::new(env!("CARGO_BIN_EXE_merlint"))
}

#[test]
fn test_clean_fixtures_lint_clean() {
    let engine = Engine::new(Config::default());
    let dir = fixtures("clean").display().to_string();
    let files = engine.discover_files(&[dir]).unwrap();

    // notes.txt is outside the include patterns
    assert_eq!(files.len(), 3);

    let result = engine.lint(&files);
    assert!(result.is_clean(), "{:?}", result.files);
    assert_eq!(result.exit_code(), 0);

    let dialects: Vec<_> = result.files.iter().filter_map(|f| f.dialect.as_deref()).collect();
    assert_eq!(dialects, vec!["flowchart", "pie", "sequence"]);
}

#[test]
fn test_broken_fixtures_report_codes() {
    let engine = Engine::new(Config::default());

    assert_eq!(
        sorted_codes(&engine, "broken/pie.mmd"),
        vec![PIE_MISSING_COLON]
    );
    assert_eq!(
        sorted_codes(&engine, "broken/sequence.mmd"),
        vec![KEYWORD_MISSPELLED, SEQ_ARROW_INVALID, SEQ_MESSAGE_MISSING_COLON]
    );
    assert_eq!(
        sorted_codes(&engine, "broken/unknown.mmd"),
        vec![UNKNOWN_DIAGRAM]
    );
    assert!(sorted_codes(&engine, "broken/flowchart.mmd").contains(&ARROW_INVALID.to_string()));
}

#[test]
fn test_fix_broken_fixtures() {
    let engine = Engine::new(Config::default());

    let outcome = engine.fix_text(&fixture("broken/sequence.mmd"));
    assert_eq!(
        outcome.fixed,
        "sequenceDiagram\n    participant Alice\n    Alice->>Bob: hi\n    Alice->>Bob: hello\n"
    );
    assert!(outcome.errors.is_empty());

    let outcome = engine.fix_text(&fixture("broken/pie.mmd"));
    assert_eq!(
        outcome.fixed,
        "pie title Pets\n    \"Dogs\": 42\n    \"Cats\" : 85\n"
    );

    let outcome = engine.fix_text(&fixture("broken/flowchart.mmd"));
    assert_eq!(
        outcome.fixed,
        "flowchart TD\n    A --> B\n    B[call &#40;x&#41;] --> C\n    D --> E\n"
    );
    assert!(outcome.errors.is_empty());
    assert!(outcome.passes >= 1);
}

#[test]
fn test_fixed_text_is_a_fixed_point() {
    let engine = Engine::new(Config::default());
    for name in ["broken/flowchart.mmd", "broken/pie.mmd", "broken/sequence.mmd"] {
        let once = engine.fix_text(&fixture(name));
        let twice = engine.fix_text(&once.fixed);
        assert_eq!(twice.fixed, once.fixed, "{}", name);
        assert_eq!(twice.edits_applied, 0, "{}", name);
    }
}

#[test]
fn test_safe_level_leaves_heuristic_fixes() {
    let text = "flowchart TD\nsubgraph one\n  A --> B\n";

    let engine = Engine::new(Config::default());
    let outcome = engine.fix_text(text);
    assert_eq!(outcome.fixed, text);
    assert_eq!(outcome.errors.len(), 1);

    let mut config = Config::default();
    config.fix.level = FixLevel::All;
    let outcome = Engine::new(config).fix_text(text);
    assert_eq!(outcome.fixed, "flowchart TD\nsubgraph one\n  A --> B\nend\n");
}

#[test]
fn test_fixer_writes_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("seq.mmd");
    fs::write(&path, fixture("broken/sequence.mmd")).unwrap();

    let engine = Engine::new(Config::default());
    let result = Fixer::new(&engine)
        .with_mode(FixMode::Write)
        .fix_files(&[path.clone()]);

    assert_eq!(result.files_modified, 1);
    assert_eq!(result.exit_code(), 0);
    assert!(engine.lint(&[path]).is_clean());
}

#[test]
fn test_cli_list_codes() {
    let output = merlint().arg("--list-codes").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(ARROW_INVALID));
    assert!(stdout.contains(PIE_VALUE_ZERO));
    assert!(stdout.contains("fix: replace token, safe"), "{}", stdout);
    assert!(stdout.contains("fix: close block, all"), "{}", stdout);
}

#[test]
fn test_cli_clean_exit_code() {
    let output = merlint().arg(fixtures("clean")).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_cli_errors_exit_code() {
    let output = merlint()
        .args(["--format", "compact"])
        .arg(fixtures("broken/pie.mmd"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pie.mmd:2:11: error [PIE_MISSING_COLON]"), "{}", stdout);
}

#[test]
fn test_cli_exit_zero() {
    let output = merlint()
        .arg("--exit-zero")
        .arg(fixtures("broken/pie.mmd"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_cli_disable_code() {
    let output = merlint()
        .args(["--disable", PIE_MISSING_COLON])
        .arg(fixtures("broken/pie.mmd"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_cli_json_output() {
    let output = merlint()
        .args(["--format", "json"])
        .arg(fixtures("broken/sequence.mmd"))
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["files_processed"], 1);
    assert_eq!(value["summary"]["error_count"], 3);
    assert_eq!(value["files"][0]["dialect"], "sequence");
}

#[test]
fn test_cli_fix_write() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("chart.mmd");
    fs::write(&path, fixture("broken/flowchart.mmd")).unwrap();

    let output = merlint().args(["--fix", "--write"]).arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "flowchart TD\n    A --> B\n    B[call &#40;x&#41;] --> C\n    D --> E\n"
    );
}

#[test]
fn test_cli_diff_does_not_write() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pie.mmd");
    let original = fixture("broken/pie.mmd");
    fs::write(&path, &original).unwrap();

    let output = merlint().arg("--diff").arg(&path).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("+    \"Dogs\": 42"), "{}", stdout);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_cli_no_input_files() {
    let temp = TempDir::new().unwrap();
    let output = merlint().arg(temp.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}
