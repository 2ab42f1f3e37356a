//! Integration tests for top-level CLI behavior.

use std::path::Path;
use std::process::Command;

fn run_firehose(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_firehose");
    Command::new(bin)
        .args(args)
        .env_remove("FIREHOSE_LOG")
        .env_remove("FIREHOSE_REPO_ALIASES")
        .output()
        .expect("failed to run firehose binary")
}

fn write_config(dir: &Path, name: &str, myref: &str, chunk: &str) -> String {
    let path = dir.join(name);
    let text = format!(
        "kind: firehose
landing:
  repo: baserock:baserock/definitions
  baseref: master
  myref: {myref}
  stratum: bsp-x86_64-generic
  chunk: {chunk}
tracking:
  mode: refs
  filters:
    - ^refs/tags/v3\\.[0-9]+$
  transforms:
    - match: ^refs/tags/v
      replacement: ''
"
    );
    std::fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn no_subcommand_shows_usage() {
    let output = run_firehose(&[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Usage"));
}

#[test]
fn check_without_configs_fails() {
    let output = run_firehose(&["check"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("expected at least one firehose config"));
}

#[test]
fn check_accepts_consistent_configs() {
    let dir = tempfile::tempdir().unwrap();
    let linux = write_config(dir.path(), "linux.yaml", "firehose/all", "linux");
    let firmware = write_config(dir.path(), "firmware.yaml", "firehose/all", "linux-firmware");

    let output = run_firehose(&["check", &linux, &firmware]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Landing baserock:baserock/definitions (firehose/all from master)"));
    assert!(stdout.contains("bsp-x86_64-generic:linux-firmware"));
    assert!(stdout.contains("2 config(s) OK."));
}

#[test]
fn check_rejects_inconsistent_landing() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_config(dir.path(), "a.yaml", "firehose/a", "linux");
    let b = write_config(dir.path(), "b.yaml", "firehose/b", "busybox");

    let output = run_firehose(&["check", &a, &b]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("not all firehoses have the same landing myref"));
}

#[test]
fn check_rejects_non_firehose_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("core.morph");
    std::fs::write(&path, "name: core\nkind: stratum\n").unwrap();

    let output = run_firehose(&["check", &path.to_string_lossy()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("not a firehose document"));
}

#[test]
fn land_help_shows_options() {
    let output = run_firehose(&["land", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--dry-run"));
    assert!(stdout.contains("--commit"));
    assert!(stdout.contains("--workspace"));
}
