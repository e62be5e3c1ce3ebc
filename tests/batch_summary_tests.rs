//! Batch orchestration tests: discovery, fault isolation, summary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

mod utils;

use assert_cmd::Command;
use predicates::prelude::*;

fn medir() -> Command {
    Command::cargo_bin("medir").unwrap()
}

#[test]
fn test_failing_first_document_still_summarizes_second() {
    let dir = tempfile::tempdir().unwrap();
    utils::write_notebook(dir.path(), "a_broken.ipynb", "class Solution\n  oops");
    utils::write_notebook(dir.path(), "b_good.ipynb", utils::RAIN_WATER);

    medir()
        .arg("--dir")
        .arg(dir.path())
        .arg("--input")
        .arg("[2,0,2]")
        .arg("--no-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing: a_broken.ipynb"))
        .stdout(predicate::str::contains("Processing: b_good.ipynb"))
        .stdout(predicate::str::contains("Summary (1 solutions profiled)"))
        .stdout(predicate::str::contains("Average Execution Time:"));
}

#[test]
fn test_empty_directory_reports_absence_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();

    medir()
        .arg("--dir")
        .arg(dir.path())
        .arg("--no-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notebooks found."));
}

#[test]
fn test_no_successes_prints_no_summary() {
    let dir = tempfile::tempdir().unwrap();
    utils::write_notebook(dir.path(), "helpers.ipynb", utils::HELPER_ONLY);

    medir()
        .arg("--dir")
        .arg(dir.path())
        .arg("--input")
        .arg("[1]")
        .arg("--no-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary").not());
}

#[test]
fn test_builtin_input_table_keys_on_notebook_stem() {
    let dir = tempfile::tempdir().unwrap();
    utils::write_notebook(dir.path(), "42. Trapping Rain Water.ipynb", utils::RAIN_WATER);

    medir()
        .arg("--dir")
        .arg(dir.path())
        .arg("--no-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: 2"))
        .stdout(predicate::str::contains("Summary (1 solutions profiled)"));
}

#[test]
fn test_notebooks_without_input_are_skipped_not_failed() {
    let dir = tempfile::tempdir().unwrap();
    utils::write_notebook(dir.path(), "999. Mystery.ipynb", utils::RAIN_WATER);

    medir()
        .arg("--dir")
        .arg(dir.path())
        .arg("--no-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("no test input available"));
}

#[test]
fn test_batch_processes_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    utils::write_notebook(dir.path(), "b_second.ipynb", utils::RAIN_WATER);
    utils::write_notebook(dir.path(), "a_first.ipynb", utils::RAIN_WATER);

    let output = medir()
        .arg("--dir")
        .arg(dir.path())
        .arg("--input")
        .arg("[2,0,2]")
        .arg("--no-log")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.find("a_first.ipynb").unwrap();
    let second = stdout.find("b_second.ipynb").unwrap();
    assert!(first < second);
}

#[test]
fn test_raising_solution_counts_as_failure_not_success() {
    let dir = tempfile::tempdir().unwrap();
    utils::write_notebook(dir.path(), "bad.ipynb", utils::RAISER);
    utils::write_notebook(dir.path(), "good.ipynb", utils::RAIN_WATER);

    medir()
        .arg("--dir")
        .arg(dir.path())
        .arg("--input")
        .arg("[2,0,2]")
        .arg("--no-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("intentional failure"))
        .stdout(predicate::str::contains("Summary (1 solutions profiled)"));
}

#[test]
fn test_memory_summary_line_requires_flag() {
    let dir = tempfile::tempdir().unwrap();
    utils::write_notebook(dir.path(), "rain.ipynb", utils::RAIN_WATER);

    medir()
        .arg("--dir")
        .arg(dir.path())
        .arg("--input")
        .arg("[2,0,2]")
        .arg("--memory")
        .arg("--no-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Average Memory Used:"));
}
