// CLI tests for tdl
// Each test runs the binary against its own temporary HOME

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct TestEnv {
    home: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tdl").unwrap();
        cmd.env("HOME", self.home.path());
        cmd.env_remove("TDL_DATA");
        cmd.env_remove("TDL_LOG");
        cmd
    }

    fn data_file(&self) -> PathBuf {
        self.home.path().join(".tdl").join("tasks.txt")
    }

    fn contents(&self) -> String {
        fs::read_to_string(self.data_file()).unwrap()
    }

    fn add(&self, label: &str, due: &str) {
        self.cmd().args(["add", label, due]).assert().success();
    }
}

#[test]
fn test_add_on_empty_store_creates_file() {
    let env = TestEnv::new();

    env.cmd()
        .args(["add", "Buy milk", "01-01-25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task 1: Buy milk (due 01-01-2025)"));

    assert_eq!(env.contents(), "1\tBuy milk\t01-01-2025\tfalse\n");
}

#[test]
fn test_list_on_fresh_home() {
    let env = TestEnv::new();

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."));

    assert!(env.data_file().exists());
}

#[test]
fn test_deleted_id_is_reused() {
    let env = TestEnv::new();
    env.add("first", "01-01-25");
    env.add("second", "02-01-25");

    env.cmd()
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task 1: first"));

    env.cmd()
        .args(["add", "third", "03-01-25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task 1: third"));
}

#[test]
fn test_mark_with_missing_id_continues() {
    let env = TestEnv::new();
    env.add("Buy milk", "01-01-25");

    env.cmd()
        .args(["mark", "1", "99"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Marked task 1 done"))
        .stderr(predicate::str::contains("Task 99 not found"))
        .stderr(predicate::str::contains("Error:"));

    assert_eq!(env.contents(), "1\tBuy milk\t01-01-2025\ttrue\n");
}

#[test]
fn test_mark_twice_is_not_an_error() {
    let env = TestEnv::new();
    env.add("Buy milk", "01-01-25");

    env.cmd().args(["mark", "1"]).assert().success();
    env.cmd().args(["m", "1"]).assert().success();
    assert!(env.contents().ends_with("\ttrue\n"));

    env.cmd().args(["unmark", "1"]).assert().success();
    assert!(env.contents().ends_with("\tfalse\n"));
}

#[test]
fn test_search_is_case_insensitive() {
    let env = TestEnv::new();
    env.add("Buy milk", "01-01-25");
    env.add("Walk dog", "02-01-25");

    env.cmd()
        .args(["search", "MILK"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk"))
        .stdout(predicate::str::contains("Walk dog").not());
}

#[test]
fn test_sort_by_date_does_not_rewrite_file() {
    let env = TestEnv::new();
    env.add("late", "03-01-25");
    env.add("early", "01-01-25");
    env.add("middle", "02-01-25");
    let before = env.contents();

    let output = env.cmd().args(["sort", "by_date", "--json"]).output().unwrap();
    assert!(output.status.success());
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let labels: Vec<&str> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["early", "middle", "late"]);

    assert_eq!(env.contents(), before);
}

#[test]
fn test_sort_rejects_unknown_criterion() {
    let env = TestEnv::new();

    env.cmd()
        .args(["sort", "by_name"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid sort criterion 'by_name'"));
}

#[test]
fn test_add_rejects_bad_date() {
    let env = TestEnv::new();

    env.cmd()
        .args(["add", "Impossible", "31-02-25"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"))
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn test_edit_keeps_done_flag() {
    let env = TestEnv::new();
    env.add("Buy milk", "01-01-25");
    env.cmd().args(["mark", "1"]).assert().success();

    env.cmd()
        .args(["edit", "1", "Buy oat milk", "05-01-2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Modified task 1: Buy oat milk (due 05-01-2025) [done]"));

    assert_eq!(env.contents(), "1\tBuy oat milk\t05-01-2025\ttrue\n");
}

#[test]
fn test_edit_missing_task() {
    let env = TestEnv::new();

    env.cmd()
        .args(["edit", "4", "Nothing", "01-01-25"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("task 4 not found"));
}

#[test]
fn test_unknown_command_shows_help() {
    let env = TestEnv::new();

    env.cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage:"))
        .stderr(predicate::str::contains("Commands:"));
}

#[test]
fn test_abbreviated_commands() {
    let env = TestEnv::new();
    env.add("Buy milk", "01-01-25");

    env.cmd()
        .arg("li")
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk"));

    env.cmd()
        .args(["S", "milk"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Ambiguous command"));
}

#[test]
fn test_malformed_file_is_internal_error() {
    let env = TestEnv::new();
    fs::create_dir_all(env.data_file().parent().unwrap()).unwrap();
    fs::write(env.data_file(), "1\tBuy milk\tnot-a-date\tfalse\n").unwrap();

    env.cmd()
        .arg("list")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Internal error:"))
        .stderr(predicate::str::contains("line 1"));

    // Nothing was rewritten
    assert_eq!(env.contents(), "1\tBuy milk\tnot-a-date\tfalse\n");
}

#[test]
fn test_rc_file_sets_data_location() {
    let env = TestEnv::new();
    let rc_dir = env.home.path().join(".tdl");
    fs::create_dir_all(&rc_dir).unwrap();
    fs::write(rc_dir.join("rc"), "data.location=lists/personal.txt\n").unwrap();

    env.add("Water plants", "today");

    let custom = rc_dir.join("lists").join("personal.txt");
    assert!(fs::read_to_string(custom).unwrap().contains("Water plants"));
    assert!(!env.data_file().exists());
}

#[test]
fn test_data_env_overrides_rc() {
    let env = TestEnv::new();
    let target = env.home.path().join("elsewhere.txt");

    env.cmd()
        .env("TDL_DATA", &target)
        .args(["add", "Elsewhere", "01-01-25"])
        .assert()
        .success();

    assert!(fs::read_to_string(target).unwrap().contains("Elsewhere"));
}

#[test]
fn test_labels_with_tabs_round_trip() {
    let env = TestEnv::new();
    env.add("col1\tcol2", "01-01-25");

    assert_eq!(env.contents(), "1\tcol1\\tcol2\t01-01-2025\tfalse\n");

    let output = env.cmd().args(["list", "--json"]).output().unwrap();
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tasks[0]["label"], "col1\tcol2");
}

#[test]
fn test_version_flag() {
    let env = TestEnv::new();
    env.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
