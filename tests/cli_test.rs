//! End-to-end CLI tests against the built `kanuni` binary. Config-touching
//! commands redirect `XDG_CONFIG_HOME` to a tempdir so they never read or
//! write the real user configuration.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn cmd() -> Command {
    Command::cargo_bin("kanuni").unwrap()
}

#[test]
fn help_lists_all_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn completions_bash_generates_a_script() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kanuni"));
}

#[test]
fn extract_reports_dates_found_in_a_plain_text_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "The motion was filed on 03/15/2024 in the circuit court."
    )
    .unwrap();

    cmd()
        .args(["extract", file.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-15"));
}

#[test]
fn extract_over_a_directory_merges_dates_across_files() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "filed on 03/15/2024").unwrap();
    std::fs::write(dir.path().join("b.txt"), "hearing scheduled April 20, 2024").unwrap();

    cmd()
        .args(["extract", dir.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-15"))
        .stdout(predicate::str::contains("2024-04-20"));
}

#[test]
fn config_show_uses_isolated_xdg_config_home() {
    let config_home = tempdir().unwrap();

    cmd()
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Providers"))
        .stdout(predicate::str::contains("Orchestrator"));

    assert!(config_home.path().join("kanuni").join("config.toml").exists());
}

#[test]
fn config_set_then_show_round_trips_a_value() {
    let config_home = tempdir().unwrap();

    cmd()
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["config", "set", "providers.ollama.model", "llama3.1"])
        .assert()
        .success();

    cmd()
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("llama3.1"));
}

#[test]
fn classify_without_any_configured_provider_fails_with_a_clear_error() {
    let config_home = tempdir().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "An order regarding the pending motion.").unwrap();

    // The default config pre-populates a local Ollama endpoint, which counts
    // as "configured" without an API key. Blank it so no provider qualifies.
    cmd()
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["config", "set", "providers.ollama.base_url", ""])
        .assert()
        .success();

    cmd()
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["classify", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no AI provider is configured"));
}
