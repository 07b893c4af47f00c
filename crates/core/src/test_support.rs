// SPDX-License-Identifier: MIT

//! Fixtures shared by downstream crates' test suites.

/// A minimal, valid process configuration document with one manager and
/// two thread workers, suitable for exercising the supervisor/manager/
/// worker pipeline without a live ZeroMQ broker.
pub fn single_manager_thread_config_json(process_name: &str) -> String {
    format!(
        r#"[
  {{
    "processname": "{process_name}",
    "dataflow_type": "binary",
    "processing_type": "thread",
    "datasocket_type": "pushpull",
    "data_lp_socket": "tcp://127.0.0.1:15556",
    "data_hp_socket": "tcp://127.0.0.1:15557",
    "command_socket": "tcp://127.0.0.1:15558",
    "monitoring_socket": "tcp://127.0.0.1:15559",
    "manager_result_socket": ["tcp://127.0.0.1:15560"],
    "manager_result_socket_type": ["pushpull"],
    "manager_result_dataflow_type": ["binary"],
    "manager_num_workers": [2]
  }}
]"#
    )
}
