// SPDX-License-Identifier: MIT

//! End-to-end CLI tests for the `rtadpd` binary: argument handling and the
//! config/bind error-to-exit-code mapping described in SPEC_FULL.md §4.K
//! and §6 ("Exit code 0 on clean shutdown, non-zero on configuration or
//! bind failure"). These run against the built binary rather than the
//! library crates, so they exercise the same path an operator hits.

use assert_cmd::Command;
use predicates::str::contains;

fn rtadpd() -> Command {
    Command::cargo_bin("rtadpd").unwrap()
}

fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    std::fs::write(&path, contents).unwrap();
    path
}

fn valid_record(processname: &str) -> serde_json::Value {
    serde_json::json!({
        "processname": processname,
        "dataflow_type": "binary",
        "processing_type": "thread",
        "datasocket_type": "pushpull",
        "data_lp_socket": "tcp://127.0.0.1:15551",
        "data_hp_socket": "tcp://127.0.0.1:15552",
        "command_socket": "tcp://127.0.0.1:15553",
        "monitoring_socket": "tcp://127.0.0.1:15554",
        "manager_result_socket": ["none"],
        "manager_result_socket_type": ["pushpull"],
        "manager_result_dataflow_type": ["binary"],
        "manager_num_workers": [1],
    })
}

#[test]
fn missing_config_file_exits_nonzero() {
    rtadpd()
        .args(["/no/such/path.json", "anything"])
        .assert()
        .failure()
        .stderr(contains("config error"));
}

#[test]
fn malformed_json_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "not json");

    rtadpd().args([path.to_str().unwrap(), "anything"]).assert().failure().stderr(contains("config error"));
}

#[test]
fn config_not_an_array_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, r#"{"processname":"S"}"#);

    rtadpd().args([path.to_str().unwrap(), "S"]).assert().failure().stderr(contains("config error"));
}

#[test]
fn unknown_process_name_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let contents = serde_json::to_string(&serde_json::json!([valid_record("S")])).unwrap();
    let path = write_config(&dir, &contents);

    rtadpd().args([path.to_str().unwrap(), "does-not-exist"]).assert().failure().stderr(contains("config error"));
}

#[test]
fn missing_required_field_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = valid_record("S");
    record.as_object_mut().unwrap().remove("manager_num_workers");
    let contents = serde_json::to_string(&serde_json::json!([record])).unwrap();
    let path = write_config(&dir, &contents);

    rtadpd().args([path.to_str().unwrap(), "S"]).assert().failure().stderr(contains("config error"));
}

#[test]
fn mismatched_manager_list_lengths_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = valid_record("S");
    record["manager_num_workers"] = serde_json::json!([1, 2]);
    let contents = serde_json::to_string(&serde_json::json!([record])).unwrap();
    let path = write_config(&dir, &contents);

    rtadpd().args([path.to_str().unwrap(), "S"]).assert().failure().stderr(contains("config error"));
}

#[test]
fn missing_args_exits_nonzero() {
    rtadpd().assert().failure();
}

#[test]
fn version_flag_reports_binary_version() {
    rtadpd().arg("--version").assert().success().stdout(contains("rtadpd"));
}
