use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cache_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("inithooks-cache").unwrap();
    cmd.env("INITHOOKS_CACHE", dir);
    cmd
}

#[test]
fn read_of_unset_key_prints_nothing() {
    let dir = tempdir().unwrap();
    cache_cmd(dir.path())
        .arg("hostname")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn write_then_read_round_trips() {
    let dir = tempdir().unwrap();

    cache_cmd(dir.path())
        .args(["hostname", "core.example.com"])
        .assert()
        .success();

    cache_cmd(dir.path())
        .arg("hostname")
        .assert()
        .success()
        .stdout("core.example.com\n");

    assert_eq!(
        std::fs::read_to_string(dir.path().join("hostname")).unwrap(),
        "core.example.com"
    );
}

#[test]
fn empty_stored_value_prints_nothing() {
    let dir = tempdir().unwrap();

    cache_cmd(dir.path()).args(["hostname", ""]).assert().success();

    cache_cmd(dir.path())
        .arg("hostname")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn cache_dir_flag_overrides_environment() {
    let env_dir = tempdir().unwrap();
    let flag_dir = tempdir().unwrap();

    cache_cmd(env_dir.path())
        .arg("--cache-dir")
        .arg(flag_dir.path())
        .args(["hostname", "core.example.com"])
        .assert()
        .success();

    assert!(flag_dir.path().join("hostname").is_file());
    assert!(!env_dir.path().join("hostname").exists());
}

#[test]
fn path_separator_key_is_fatal() {
    let dir = tempdir().unwrap();
    cache_cmd(dir.path())
        .args(["../escape", "boom"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid cache key"));
}

#[test]
fn missing_key_argument_is_a_usage_error() {
    let dir = tempdir().unwrap();
    cache_cmd(dir.path()).assert().failure();
}
