//! CLI tests for the `zjson` binary.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn zjson(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_zjson"))
        .arg("--dir")
        .arg(dir)
        .arg("db.json")
        .args(args)
        .output()
        .expect("failed to run zjson")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "zjson failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_set_get_del() {
    let tmp = TempDir::new().unwrap();

    assert_eq!(stdout(&zjson(tmp.path(), &["set", "n", "42"])), "42");
    assert_eq!(stdout(&zjson(tmp.path(), &["set", "s", "hello"])), "\"hello\"");
    assert_eq!(stdout(&zjson(tmp.path(), &["get", "n"])), "42");
    assert_eq!(stdout(&zjson(tmp.path(), &["get", "s"])), "\"hello\"");

    assert_eq!(stdout(&zjson(tmp.path(), &["del", "n"])), "true");
    assert_eq!(stdout(&zjson(tmp.path(), &["get", "n"])), "null");
}

#[test]
fn test_expire_and_ttl() {
    let tmp = TempDir::new().unwrap();

    let stored = stdout(&zjson(tmp.path(), &["set", "t", "[1,2]", "--expire", "60"]));
    assert!(stored.contains("expire_stamp"));

    let ttl: f64 = stdout(&zjson(tmp.path(), &["ttl", "t"])).parse().unwrap();
    assert!(ttl > 0.0 && ttl <= 60.0);
    assert_eq!(stdout(&zjson(tmp.path(), &["ttl", "missing"])), "null");
}

#[test]
fn test_keys_and_clear() {
    let tmp = TempDir::new().unwrap();
    for key in ["a1", "b1", "a2"] {
        stdout(&zjson(tmp.path(), &["set", key, "1"]));
    }

    assert_eq!(stdout(&zjson(tmp.path(), &["keys", "--pattern", "^a"])), "a1\na2");
    assert_eq!(stdout(&zjson(tmp.path(), &["keys", "--limit", "1"])), "a1");

    stdout(&zjson(tmp.path(), &["clear"]));
    assert_eq!(stdout(&zjson(tmp.path(), &["keys"])), "");
}

#[test]
fn test_backup_and_restore() {
    let tmp = TempDir::new().unwrap();
    stdout(&zjson(tmp.path(), &["set", "k", "\"v\""]));

    let snap = tmp.path().join("snap.json");
    let written = stdout(&zjson(tmp.path(), &["backup", "--to", snap.to_str().unwrap()]));
    assert_eq!(Path::new(&written), snap);

    stdout(&zjson(tmp.path(), &["clear"]));
    stdout(&zjson(tmp.path(), &["restore", snap.to_str().unwrap()]));
    assert_eq!(stdout(&zjson(tmp.path(), &["get", "k"])), "\"v\"");
}

#[test]
fn test_invalid_pattern_fails() {
    let tmp = TempDir::new().unwrap();
    let output = zjson(tmp.path(), &["keys", "--pattern", "("]);
    assert!(!output.status.success());
}
