//! Integration tests for the `netnest` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! config inspection, and placeholder rendering for absent sources, all
//! without any live backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `netnest` binary with env isolation.
///
/// Clears all `NETNEST_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn netnest_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("netnest");
    cmd.env("HOME", "/tmp/netnest-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/netnest-cli-test-nonexistent")
        .env_remove("NETNEST_CONFIG")
        .env_remove("NETNEST_OUTPUT")
        .env_remove("NETNEST_UNIFI__ENABLED")
        .env_remove("NETNEST_UNIFI__BASE_URL")
        .env_remove("NETNEST_UNIFI__USERNAME")
        .env_remove("NETNEST_UNIFI__PASSWORD")
        .env_remove("NETNEST_GOVEE__ENABLED")
        .env_remove("NETNEST_GOVEE__API_KEY")
        .env_remove("NETNEST_TAILSCALE__ENABLED")
        .env_remove("NETNEST_SPEEDTEST__ENABLED")
        .env_remove("NETNEST_AGENTS__SERVER_URL")
        .env_remove("NETNEST_AGENTS__DESKTOP_URL");
    cmd
}

/// Config file with every source switched off, so no command spawns a
/// subprocess or opens a socket.
fn disabled_config() -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        "[unifi]\nenabled = false\n\n\
         [govee]\nenabled = false\n\n\
         [tailscale]\nenabled = false\n\n\
         [speedtest]\nenabled = false\n",
    )
    .unwrap();
    file
}

fn path_arg(file: &tempfile::NamedTempFile) -> String {
    file.path().display().to_string()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = netnest_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    netnest_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("clients"))
            .and(predicate::str::contains("lights"))
            .and(predicate::str::contains("vpn"))
            .and(predicate::str::contains("speedtest"))
            .and(predicate::str::contains("agents")),
    );
}

#[test]
fn test_version_flag() {
    netnest_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netnest"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    netnest_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    netnest_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    netnest_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = netnest_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = netnest_cmd()
        .args(["--output", "bogus", "status"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config inspection ───────────────────────────────────────────────

#[test]
fn test_config_path_prints_location() {
    netnest_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("netnest"));
}

#[test]
fn test_config_path_honors_override() {
    netnest_cmd()
        .args(["--config", "/tmp/custom-netnest.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/custom-netnest.toml"));
}

#[test]
fn test_config_show_renders_defaults_without_file() {
    netnest_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[unifi]").and(predicate::str::contains("239.255.255.250")),
        );
}

#[test]
fn test_config_show_reads_file_values() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "[unifi]\nsite = \"garage\"\n").unwrap();
    let path = path_arg(&file);

    netnest_cmd()
        .args(["--config", path.as_str(), "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("garage"));
}

// ── Absent sources ──────────────────────────────────────────────────

#[test]
fn test_status_reports_every_source_disabled() {
    let cfg = disabled_config();
    let path = path_arg(&cfg);
    netnest_cmd()
        .args(["--config", path.as_str(), "status"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Network clients")
                .and(predicate::str::contains("disabled or unavailable")),
        );
}

#[test]
fn test_status_json_renders_null_sources() {
    let cfg = disabled_config();
    let path = path_arg(&cfg);
    netnest_cmd()
        .args(["--config", path.as_str(), "--output", "json", "status"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"clients\": null")
                .and(predicate::str::contains("\"speedtest\": null")),
        );
}

#[test]
fn test_status_plain_uses_dash_for_absent() {
    let cfg = disabled_config();
    let path = path_arg(&cfg);
    netnest_cmd()
        .args(["--config", path.as_str(), "--output", "plain", "status"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("clients -").and(predicate::str::contains("desktop-agent -")),
        );
}

#[test]
fn test_clients_absent_notes_on_stderr() {
    let cfg = disabled_config();
    let path = path_arg(&cfg);
    netnest_cmd()
        .args(["--config", path.as_str(), "clients"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("controller: disabled or unavailable"));
}

#[test]
fn test_vpn_absent_notes_on_stderr() {
    let cfg = disabled_config();
    let path = path_arg(&cfg);
    netnest_cmd()
        .args(["--config", path.as_str(), "vpn"])
        .assert()
        .success()
        .stderr(predicate::str::contains("tailscale: disabled or unavailable"));
}

#[test]
fn test_agents_absent_notes_both() {
    let cfg = disabled_config();
    let path = path_arg(&cfg);
    netnest_cmd()
        .args(["--config", path.as_str(), "agents"])
        .assert()
        .success()
        .stderr(
            predicate::str::contains("server agent: disabled or unavailable")
                .and(predicate::str::contains("desktop agent: disabled or unavailable")),
        );
}

#[test]
fn test_quiet_suppresses_absent_notes() {
    let cfg = disabled_config();
    let path = path_arg(&cfg);
    netnest_cmd()
        .args(["--config", path.as_str(), "-q", "clients"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("controller").not());
}

// ── Control failures ────────────────────────────────────────────────

#[test]
fn test_lights_turn_fails_without_api_key() {
    let cfg = disabled_config();
    let path = path_arg(&cfg);
    let output = netnest_cmd()
        .args([
            "--config",
            path.as_str(),
            "lights",
            "turn",
            "AA:BB:CC:DD",
            "H6159",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4), "Expected control exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("disabled or no API key"),
        "Expected control failure message:\n{text}"
    );
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_lights_subcommands_exist() {
    netnest_cmd()
        .args(["lights", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("turn"))
                .and(predicate::str::contains("send")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    netnest_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show").and(predicate::str::contains("path")));
}
