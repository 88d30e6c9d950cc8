use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_themeshot_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("themeshot")
}

#[test]
fn test_completion_command_help() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("completion").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate shell completion scripts",
        ))
        .stdout(predicate::str::contains("SUPPORTED SHELLS"))
        .stdout(predicate::str::contains("INSTALLATION"))
        .stdout(predicate::str::contains("~/.bashrc"));
}

#[test]
fn test_completion_bash_generates_script() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("completion").arg("--shell").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_themeshot()"))
        .stdout(predicate::str::contains("complete -F _themeshot"));
}

#[test]
fn test_completion_zsh_generates_script() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("completion").arg("--shell").arg("zsh");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#compdef themeshot"));
}

#[test]
fn test_completion_fish_lists_subcommands() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("completion").arg("--shell").arg("fish");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("complete -c themeshot"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_completion_invalid_shell() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("completion").arg("--shell").arg("invalid-shell");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_completion_requires_shell_flag() {
    let mut cmd = Command::new(get_themeshot_bin());
    cmd.arg("completion");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
