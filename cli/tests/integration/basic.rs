//! Basic functionality integration tests for tmirror CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, parse_json};
use predicates::prelude::*;
use rstest::rstest;
use std::fs;

#[test]
fn test_mirror_into_empty_destination() {
    let fx = TestFixture::new();
    fx.write_src("file1.txt", "content1");
    fx.write_src("subdir/file2.txt", "content2");
    fx.write_src("subdir/nested/file3.txt", "content3");

    fx.mirror_cmd().arg("-q").assert().success();

    fx.assert_file_content(&fx.dst_path("file1.txt"), "content1");
    fx.assert_file_content(&fx.dst_path("subdir/file2.txt"), "content2");
    fx.assert_file_content(&fx.dst_path("subdir/nested/file3.txt"), "content3");
}

#[test]
fn test_nested_structure_is_complete() {
    let fx = TestFixture::new();
    fx.create_nested_structure(6, 3);

    fx.mirror_cmd().arg("-q").assert().success();

    assert_eq!(fx.count_files_recursive(fx.dst.path()), 18);
    fx.assert_file_content(
        &fx.dst_path("level0/level1/level2/level3/level4/level5/file2.txt"),
        "content at level 5",
    );
}

#[test]
fn test_empty_source_directory() {
    let fx = TestFixture::new();

    fx.mirror_cmd()
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to do"));

    assert_eq!(fs::read_dir(fx.dst.path()).unwrap().count(), 0);
}

#[test]
fn test_hidden_entries_are_not_mirrored() {
    let fx = TestFixture::new();
    fx.write_src(".git/config", "[core]");
    fx.write_src(".hidden", "secret");
    fx.write_src("docs/.draft", "wip");
    fx.write_src("docs/readme.md", "# docs");

    fx.mirror_cmd().arg("-q").assert().success();

    assert!(!fx.dst_path(".git").exists());
    assert!(!fx.dst_path(".hidden").exists());
    assert!(!fx.dst_path("docs/.draft").exists());
    fx.assert_file_content(&fx.dst_path("docs/readme.md"), "# docs");
}

#[test]
fn test_destination_extras_are_kept() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", "a");
    fx.write_dst("only-in-dst/b.txt", "b");

    fx.mirror_cmd().arg("-q").assert().success();

    fx.assert_file_content(&fx.dst_path("a.txt"), "a");
    fx.assert_file_content(&fx.dst_path("only-in-dst/b.txt"), "b");
}

#[rstest]
#[case::single_worker("1")]
#[case::few_workers("3")]
#[case::many_workers("64")]
fn test_jobs_setting(#[case] jobs: &str) {
    let fx = TestFixture::new();
    for i in 0..12 {
        fx.write_src(&format!("d{i}/inner/f.txt"), &format!("body {i}"));
    }

    fx.mirror_cmd().args(["-q", "-j", jobs]).assert().success();

    for i in 0..12 {
        fx.assert_file_content(&fx.dst_path(&format!("d{i}/inner/f.txt")), &format!("body {i}"));
    }
}

#[test]
fn test_json_output_reports_stats() {
    let fx = TestFixture::new();
    fx.write_src("a/one.txt", "1");
    fx.write_src("b/two.txt", "22");
    fx.write_src("top.txt", "333");

    let output = fx
        .mirror_cmd()
        .args(["--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value = parse_json(&output.stdout);
    assert_eq!(value["status"], "ok");
    assert_eq!(value["stats"]["files_created"], 3);
    assert_eq!(value["stats"]["dirs_created"], 2);
    assert_eq!(value["stats"]["bytes_copied"], 6);
    assert_eq!(value["stats"]["workers"], 3);
    assert_eq!(value["stats"]["failed_workers"], 0);
}

#[test]
fn test_human_summary() {
    let fx = TestFixture::new();
    fx.write_src("x/y.txt", "hello");

    fx.mirror_cmd()
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mirrored 1 created, 1 dirs"));
}

#[test]
fn test_verbose_lists_decisions() {
    let fx = TestFixture::new();
    fx.write_src("new.txt", "new");

    fx.mirror_cmd()
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("create"))
        .stdout(predicate::str::contains("Files created:      1"));
}

#[test]
fn test_help_and_version() {
    let mut cmd = cargo_bin_cmd!("tmirror");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--digest"));

    let mut cmd = cargo_bin_cmd!("tmirror");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tmirror"));
}
