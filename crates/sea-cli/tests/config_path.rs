use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sea")
        .env("SEA_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("sea")
        .env("SEA_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("# base_url ="));
    assert!(contents.contains("request_timeout_secs = 0"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("sea")
        .env("SEA_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_set_base_url_preserves_comments() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# keep me\nrequest_timeout_secs = 5\n").unwrap();

    cargo_bin_cmd!("sea")
        .env("SEA_HOME", dir.path())
        .args(["config", "set-base-url", "https://sea.example.com/api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved base_url"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("# keep me"));
    assert!(contents.contains("request_timeout_secs = 5"));
    assert!(contents.contains(r#"base_url = "https://sea.example.com/api/""#));
}

#[test]
fn test_set_base_url_rejects_invalid_url() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sea")
        .env("SEA_HOME", dir.path())
        .args(["config", "set-base-url", "not a url"])
        .assert()
        .failure();

    assert!(!dir.path().join("config.toml").exists());
}
