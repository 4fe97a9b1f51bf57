//! Tests for profile persistence via the CLI (non-interactive paths only).
//! Each test isolates the config dir with XDG_CONFIG_HOME in a tempdir and
//! uses --dry-run so the binary exits after profile handling.
use std::fs;
use std::process::Command;

fn run_solartop(args: &[&str], config_home: &std::path::Path) -> (bool, String) {
    let exe = env!("CARGO_BIN_EXE_solartop");
    let output = Command::new(exe)
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .output()
        .expect("run solartop");
    let ok = output.status.success();
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (ok, text)
}

fn profiles_path(config_home: &std::path::Path) -> std::path::PathBuf {
    config_home.join("solartop").join("profiles.json")
}

#[test]
fn test_profile_created_on_first_use() {
    let td = tempfile::tempdir().unwrap();
    // profile + url => should create profiles.json, then --dry-run exits
    let (_ok, _out) = run_solartop(
        &["--profile", "unittest", "ws://example:1/ws", "--dry-run"],
        td.path(),
    );
    let data = fs::read_to_string(profiles_path(td.path())).expect("profiles.json created");
    assert!(
        data.contains("unittest") && data.contains("ws://example:1/ws"),
        "profiles.json missing profile entry: {data}"
    );
}

#[test]
fn test_profile_overwrite_only_when_changed() {
    let td = tempfile::tempdir().unwrap();
    // Initial create
    let (_ok, _out) = run_solartop(&["--profile", "prod", "ws://one/ws", "--dry-run"], td.path());
    let first = fs::read_to_string(profiles_path(td.path())).unwrap();
    // Re-run identical (should not duplicate or corrupt)
    let (_ok2, _out2) = run_solartop(&["--profile", "prod", "ws://one/ws", "--dry-run"], td.path());
    let second = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert_eq!(first, second, "Profile file changed despite identical input");
    // Overwrite with different URL using --save (no prompt path)
    let (_ok3, _out3) = run_solartop(
        &["--profile", "prod", "--save", "ws://two/ws", "--dry-run"],
        td.path(),
    );
    let third = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(third.contains("two"), "Updated URL not written: {third}");
}

#[test]
fn test_profile_history_persisted_and_reloaded() {
    let td = tempfile::tempdir().unwrap();
    let (_ok, _out) = run_solartop(
        &["--profile", "roof", "--history", "60", "wss://host/ws", "--dry-run"],
        td.path(),
    );
    let data = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(data.contains("roof"));
    assert!(data.contains("60"), "history override not written: {data}");

    // A later run by profile name alone loads the saved entry and succeeds
    // through URL validation (wss is accepted).
    let (ok2, text2) = run_solartop(&["--profile", "roof", "--dry-run"], td.path());
    assert!(ok2, "loading a saved profile failed: {text2}");
    assert!(
        !text2.contains("Invalid URL"),
        "saved URL failed validation: {text2}"
    );
}
