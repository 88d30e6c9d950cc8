use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_themeshot_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("themeshot")
}

#[test]
fn test_themes_lists_presets() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("themes");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Theme Presets"))
        .stdout(predicate::str::contains("default"))
        .stdout(predicate::str::contains("playful"))
        .stdout(predicate::str::contains("compact"))
        .stdout(predicate::str::contains("single-page-theme.png"));
}

#[test]
fn test_themes_json_output() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("themes").arg("--format").arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let entries: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let entries = entries.as_array().unwrap();

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["name"], "default");
    assert_eq!(entries[0]["screenshot"], "default-theme.png");
    assert_eq!(entries[3]["label"], "Single Page");
}

#[test]
fn test_main_help_lists_commands() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("themes"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completion"));
}
