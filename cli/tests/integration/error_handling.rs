//! Error handling integration tests for tmirror CLI.
//!
//! These tests verify:
//! - Invalid roots are rejected before anything is written (exit code 2)
//! - A failing subdirectory does not stop its siblings (exit code 1)
//! - Diagnostics use the `ERROR: <message>: <path>` shape

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, parse_json};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_missing_source_fails() {
    let fx = TestFixture::new();
    let missing = fx.src_path("does-not-exist");

    let mut cmd = cargo_bin_cmd!("tmirror");
    cmd.arg(&missing)
        .arg(fx.dst.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("ERROR: source directory does not exist"));

    assert_eq!(fs::read_dir(fx.dst.path()).unwrap().count(), 0);
}

#[test]
fn test_source_file_is_rejected() {
    let fx = TestFixture::new();
    let file = fx.write_src("plain.txt", "not a dir");

    let mut cmd = cargo_bin_cmd!("tmirror");
    cmd.arg(&file)
        .arg(fx.dst.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("source is not a directory"));

    assert_eq!(fs::read_dir(fx.dst.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_destination_is_not_created() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");
    let missing = fx.dst_path("nested/target");

    let mut cmd = cargo_bin_cmd!("tmirror");
    cmd.arg(fx.src.path())
        .arg(&missing)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains(
            "destination directory does not exist",
        ));

    assert!(!fx.dst_path("nested").exists());
}

#[test]
fn test_destination_file_is_rejected() {
    let fx = TestFixture::new();
    let file = fx.write_dst("plain.txt", "not a dir");

    let mut cmd = cargo_bin_cmd!("tmirror");
    cmd.arg(fx.src.path())
        .arg(&file)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("destination is not a directory"));
}

#[test]
fn test_missing_arguments_is_usage_error() {
    let mut cmd = cargo_bin_cmd!("tmirror");
    cmd.arg("only-one").assert().failure().code(2);
}

#[test]
fn test_failed_subtree_does_not_stop_siblings() {
    let fx = TestFixture::new();
    fx.write_src("good/a.txt", "a");
    fx.write_src("other/b.txt", "b");
    fx.write_src("clash/c.txt", "c");
    // A file where the destination directory belongs
    fx.write_dst("clash", "in the way");

    fx.mirror_cmd()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ERROR: 1 of 4 directory workers failed"))
        .stderr(predicate::str::contains("could not create directory"));

    fx.assert_file_content(&fx.dst_path("good/a.txt"), "a");
    fx.assert_file_content(&fx.dst_path("other/b.txt"), "b");
    fx.assert_file_content(&fx.dst_path("clash"), "in the way");
}

#[test]
fn test_quiet_still_reports_worker_cause() {
    let fx = TestFixture::new();
    fx.write_src("good/a.txt", "a");
    fx.write_src("clash/c.txt", "c");
    fx.write_dst("clash", "in the way");
    let clash = fx.dst_path("clash").display().to_string();

    let output = fx.mirror_cmd().arg("-q").output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr.contains(&format!("ERROR: could not create directory: {clash}")),
        "missing cause: {stderr}"
    );
    assert!(stderr.contains("ERROR: 1 of 3 directory workers failed"));
    assert!(!stderr.contains('\x1b'), "escape codes off a terminal: {stderr}");
    fx.assert_file_content(&fx.dst_path("good/a.txt"), "a");
}

#[test]
fn test_directory_where_file_belongs() {
    let fx = TestFixture::new();
    fx.write_src("name", "file body");
    fx.write_dst("name/inside.txt", "keep");

    fx.mirror_cmd()
        .arg("-q")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "could not open destination file for writing",
        ));

    fx.assert_file_content(&fx.dst_path("name/inside.txt"), "keep");
}

#[test]
fn test_max_depth_fails_deep_workers_only() {
    let fx = TestFixture::new();
    fx.write_src("l1/shallow.txt", "shallow");
    fx.write_src("l1/l2/l3/deep.txt", "deep");

    fx.mirror_cmd()
        .args(["--max-depth", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("maximum depth 1 exceeded"))
        .stderr(predicate::str::contains("ERROR: 1 of 3 directory workers failed"));

    fx.assert_file_content(&fx.dst_path("l1/shallow.txt"), "shallow");
    assert!(!fx.dst_path("l1/l2").exists());
}

#[test]
fn test_json_error_document() {
    let fx = TestFixture::new();
    let missing = fx.src_path("missing");

    let mut cmd = cargo_bin_cmd!("tmirror");
    let output = cmd
        .arg(&missing)
        .arg(fx.dst.path())
        .args(["--output", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let value = parse_json(&output.stdout);
    assert_eq!(value["status"], "error");
    assert_eq!(value["path"], missing.display().to_string());
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_reported() {
    use common::set_mode;

    let fx = TestFixture::new();
    fx.write_src("ok/a.txt", "a");
    fx.write_src("locked/b.txt", "b");
    set_mode(&fx.src_path("locked"), 0o000);

    // root ignores permission bits, so only check the outcome when denied
    let denied = fs::read_dir(fx.src_path("locked")).is_err();
    let assert = fx.mirror_cmd().assert();
    set_mode(&fx.src_path("locked"), 0o755);

    if denied {
        assert
            .failure()
            .code(1)
            .stderr(predicate::str::contains("could not read directory"));
    } else {
        assert.success();
    }
    fx.assert_file_content(&fx.dst_path("ok/a.txt"), "a");
}
