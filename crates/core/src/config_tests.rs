// SPDX-License-Identifier: MIT

use super::*;
use proptest::prelude::*;
use std::io::Write;

fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

const SAMPLE_CONFIG: &str = r#"
[
  {
    "processname": "OOQS1",
    "dataflow_type": "binary",
    "processing_type": "thread",
    "datasocket_type": "pushpull",
    "data_lp_socket": "tcp://127.0.0.1:5556",
    "data_hp_socket": "tcp://127.0.0.1:5557",
    "command_socket": "tcp://127.0.0.1:5558",
    "monitoring_socket": "tcp://127.0.0.1:5559",
    "manager_result_socket": ["tcp://127.0.0.1:5560", "none"],
    "manager_result_socket_type": ["pushpull", "pushpull"],
    "manager_result_dataflow_type": ["binary", "binary"],
    "manager_num_workers": [4, 2]
  }
]
"#;

#[test]
fn load_missing_file_is_io_error() {
    let err = ConfigStore::load("/no/such/path/config.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn load_invalid_json_is_invalid_json_error() {
    let file = write_fixture("not json at all {{{");
    let err = ConfigStore::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidJson { .. }));
}

#[test]
fn load_non_array_top_level_is_rejected() {
    let file = write_fixture(r#"{"processname": "X"}"#);
    let err = ConfigStore::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NotAnArray { .. }));
}

#[test]
fn get_is_lenient_and_never_fails_on_missing_fields() {
    let file = write_fixture(r#"[{"processname": "bare"}]"#);
    let store = ConfigStore::load(file.path()).expect("load");
    assert!(store.get("bare").is_some());
    assert!(store.get("missing").is_none());
}

#[test]
fn validated_reports_not_found_for_unknown_process() {
    let file = write_fixture(SAMPLE_CONFIG);
    let store = ConfigStore::load(file.path()).expect("load");
    let err = store.validated("NOPE").unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(name) if name == "NOPE"));
}

#[test]
fn validated_reports_missing_field() {
    let file = write_fixture(r#"[{"processname": "bare"}]"#);
    let store = ConfigStore::load(file.path()).expect("load");
    let err = store.validated("bare").unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "dataflow_type", .. }));
}

#[test]
fn validated_reports_mismatched_manager_list_lengths() {
    let file = write_fixture(
        r#"[{
        "processname": "P",
        "dataflow_type": "binary",
        "processing_type": "thread",
        "datasocket_type": "pushpull",
        "data_lp_socket": "tcp://h:1",
        "data_hp_socket": "tcp://h:2",
        "command_socket": "tcp://h:3",
        "monitoring_socket": "tcp://h:4",
        "manager_result_socket": ["none"],
        "manager_result_socket_type": ["pushpull", "pushpull"],
        "manager_result_dataflow_type": ["binary"],
        "manager_num_workers": [1]
    }]"#,
    );
    let store = ConfigStore::load(file.path()).expect("load");
    let err = store.validated("P").unwrap_err();
    assert!(matches!(err, ConfigError::MismatchedListLength { field: "manager_result_socket_type", got: 2, expected: 1, .. }));
}

#[test]
fn validated_builds_positionally_aligned_managers() {
    let file = write_fixture(SAMPLE_CONFIG);
    let store = ConfigStore::load(file.path()).expect("load");
    let config = store.validated("OOQS1").expect("validated");

    assert_eq!(config.processname, "OOQS1");
    assert_eq!(config.dataflow_type, DataflowType::Binary);
    assert_eq!(config.processing_type, ProcessingType::Thread);
    assert_eq!(config.managers.len(), 2);
    assert_eq!(config.managers[0].num_workers, 4);
    assert_eq!(config.managers[1].num_workers, 2);
    assert!(config.managers[0].has_result_socket());
    assert!(!config.managers[1].has_result_socket());
}

#[yare::parameterized(
    tcp_host_port = { "tcp://127.0.0.1:5556", "tcp://*:5556" },
    tcp_hostname = { "tcp://telescope-a:9000", "tcp://*:9000" },
)]
fn to_bind_address_rewrites_tcp_connect_strings(input: &str, expected: &str) {
    assert_eq!(to_bind_address(input).expect("valid"), expected);
}

#[test]
fn to_bind_address_rejects_malformed_input() {
    assert!(to_bind_address("not-an-address").is_err());
    assert!(to_bind_address("udp://host:1234").is_err());
}

proptest! {
    /// For every `tcp://<host>:<port>` built from an arbitrary hostname-like
    /// string and port number, `to_bind_address` rewrites only the host
    /// segment to `*` and leaves the port untouched (§4.A).
    #[test]
    fn to_bind_address_only_rewrites_host(host in "[a-zA-Z][a-zA-Z0-9_-]{0,20}", port in 1u16..=65535) {
        let input = format!("tcp://{host}:{port}");
        let rewritten = to_bind_address(&input).expect("valid tcp address");
        prop_assert_eq!(rewritten, format!("tcp://*:{port}"));
    }
}
