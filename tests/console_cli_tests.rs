// Integration tests for the hookprof console binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn hookprof() -> Command {
    let mut cmd = Command::cargo_bin("hookprof").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_mentions_start_command() {
    hookprof()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("debughookcalls.start"));
}

#[test]
fn test_quit_exits_immediately() {
    hookprof().write_stdin("quit\n").assert().success();
}

#[test]
fn test_hooks_lists_allow_list() {
    hookprof()
        .write_stdin("hooks\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("CanAcceptItem"))
        .stdout(predicate::str::contains("OnMaxStackable"));
}

#[test]
fn test_unknown_hook_rejected() {
    hookprof()
        .write_stdin("debughookcalls.start BadHook 5\nstatus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unsupported hook name: BadHook"))
        .stdout(predicate::str::contains("Idle"));
}

#[test]
fn test_usage_on_missing_duration() {
    hookprof()
        .write_stdin("debughookcalls.start CanStackItem\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Usage: debughookcalls.start <hook name> <seconds>",
        ));
}

#[test]
fn test_measurement_reports_after_stdin_closes() {
    hookprof()
        .write_stdin(
            "debughookcalls.start OnItemSplit 0.3\n\
             fire OnItemSplit 105 0 0\n\
             fire OnItemSplit 105 0 0\n\
             fire OnItemSplit 105 0 0\n",
        )
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Subscribing to hook OnItemSplit for 0.3 second(s)",
        ))
        .stderr(predicate::str::contains(
            "Hook OnItemSplit was called 3 times over 0.3 second(s)",
        ))
        .stderr(predicate::str::contains(
            "3 calls at approximate location (100, 0, 0)",
        ));
}

#[test]
fn test_forced_restart_reports_only_new_hook() {
    hookprof()
        .write_stdin(
            "debughookcalls.start CanAcceptItem 10\n\
             fire CanAcceptItem 0 0 0\n\
             debughookcalls.start OnItemSplit 0.2\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Stopped current test for hook CanAcceptItem",
        ))
        .stderr(predicate::str::contains(
            "Hook OnItemSplit was called 0 times over 0.2 second(s)",
        ))
        .stderr(predicate::str::contains("Hook CanAcceptItem was called").not());
}

#[test]
fn test_out_of_range_duration_keeps_running_measurement() {
    hookprof()
        .write_stdin(
            "debughookcalls.start CanAcceptItem 10\n\
             debughookcalls.start OnItemSplit 1e19\n\
             status\n\
             quit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Duration must be a positive number of seconds: 10000000000000000000",
        ))
        .stdout(predicate::str::contains(
            "Measuring CanAcceptItem for 10 second(s): 0 calls so far",
        ))
        .stdout(predicate::str::contains("Stopped current test").not());
}

#[test]
fn test_json_format_prints_report() {
    hookprof()
        .args(["--format", "json"])
        .write_stdin("debughookcalls.start CanStackItem 0.2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hook\": \"CanStackItem\""))
        .stdout(predicate::str::contains("\"call_count\": 0"));
}

#[test]
fn test_config_file_renames_command() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "command = \"hp.start\"").unwrap();

    hookprof()
        .arg("--config")
        .arg(file.path())
        .write_stdin("hp.start OnMaxStackable 0.2\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Hook OnMaxStackable was called 0 times over 0.2 second(s)",
        ));
}

#[test]
fn test_invalid_config_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "grid_size = -1.0").unwrap();

    hookprof()
        .arg("--config")
        .arg(file.path())
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("grid_size must be positive"));
}

#[test]
fn test_synthetic_workload_is_counted() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[workload]
events_per_second = 200.0
jitter = 0.0

[[workload.hotspot]]
hook = "CanStackItem"
position = [1000.0, 0.0, 0.0]
"#
    )
    .unwrap();

    hookprof()
        .arg("--config")
        .arg(file.path())
        .args(["--seed", "1"])
        .write_stdin("debughookcalls.start CanStackItem 0.3\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "calls at approximate location (1000, 0, 0)",
        ));
}
