// SPDX-License-Identifier: MIT

//! Named process configuration records, loaded from a single JSON document.
//!
//! The file is a top-level array of objects; each object's `processname`
//! selects one supervisor instance at startup (see the CLI's
//! `<config_path> <process_name>` arguments). Required-field presence is
//! validated lazily — [`ConfigStore::get`] never fails, only
//! [`ConfigStore::validated`] (the strict accessor the supervisor uses at
//! startup) can return [`ConfigError::MissingField`] and friends.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BindError, ConfigError};

/// Whether ingress/egress payloads are raw bytes, UTF-8 strings, or
/// filenames to be opened by `open_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataflowType {
    Binary,
    String,
    Filename,
}

/// Whether a manager's workers run as OS threads or OS processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingType {
    Thread,
    Process,
}

/// Whether a data endpoint uses push/pull or pub/sub ZeroMQ semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketType {
    Pushpull,
    Pubsub,
}

/// Sentinel value for `manager_result_socket` meaning "no egress configured".
pub const NO_RESULT_SOCKET: &str = "none";

/// Per-manager slice of the four positionally-aligned
/// `manager_result_socket*`/`manager_num_workers` lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub index: usize,
    pub result_socket: String,
    pub result_socket_type: SocketType,
    pub result_dataflow_type: DataflowType,
    pub num_workers: u32,
}

impl ManagerConfig {
    pub fn has_result_socket(&self) -> bool {
        self.result_socket != NO_RESULT_SOCKET
    }
}

/// A fully-validated process configuration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    pub processname: String,
    pub dataflow_type: DataflowType,
    pub processing_type: ProcessingType,
    pub datasocket_type: SocketType,
    pub data_lp_socket: String,
    pub data_hp_socket: String,
    pub command_socket: String,
    pub monitoring_socket: String,
    pub managers: Vec<ManagerConfig>,
}

/// Loads and looks up process configuration records from a JSON document.
pub struct ConfigStore {
    records: Vec<Value>,
    path: std::path::PathBuf,
}

impl ConfigStore {
    /// Read `path` as a JSON document holding a top-level array of
    /// process-configuration objects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io { path: path.clone(), source })?;
        let value: Value =
            serde_json::from_str(&text).map_err(|source| ConfigError::InvalidJson { path: path.clone(), source })?;
        let records = match value {
            Value::Array(records) => records,
            _ => return Err(ConfigError::NotAnArray { path }),
        };
        Ok(Self { records, path })
    }

    /// Raw lookup by `processname`. Never validates field presence.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.records.iter().find(|record| record.get("processname").and_then(Value::as_str) == Some(name))
    }

    /// Strict lookup used by the supervisor at startup: resolves every
    /// required field, returning the specific [`ConfigError`] variant for
    /// whichever field is missing or malformed first.
    pub fn validated(&self, name: &str) -> Result<ProcessConfig, ConfigError> {
        let record = self.get(name).ok_or_else(|| ConfigError::NotFound(name.to_string()))?;

        let processname = required_str(record, name, "processname")?;
        let dataflow_type = required_enum(record, name, "dataflow_type")?;
        let processing_type = required_enum(record, name, "processing_type")?;
        let datasocket_type = required_enum(record, name, "datasocket_type")?;
        let data_lp_socket = required_str(record, name, "data_lp_socket")?;
        let data_hp_socket = required_str(record, name, "data_hp_socket")?;
        let command_socket = required_str(record, name, "command_socket")?;
        let monitoring_socket = required_str(record, name, "monitoring_socket")?;

        let result_sockets = required_str_list(record, name, "manager_result_socket")?;
        let result_socket_types = required_enum_list(record, name, "manager_result_socket_type")?;
        let result_dataflow_types = required_enum_list(record, name, "manager_result_dataflow_type")?;
        let num_workers = required_u32_list(record, name, "manager_num_workers")?;

        let expected = num_workers.len();
        for (field, got) in [
            ("manager_result_socket", result_sockets.len()),
            ("manager_result_socket_type", result_socket_types.len()),
            ("manager_result_dataflow_type", result_dataflow_types.len()),
        ] {
            if got != expected {
                return Err(ConfigError::MismatchedListLength {
                    process: name.to_string(),
                    field,
                    got,
                    expected,
                });
            }
        }

        let managers = (0..expected)
            .map(|index| ManagerConfig {
                index,
                result_socket: result_sockets[index].clone(),
                result_socket_type: result_socket_types[index],
                result_dataflow_type: result_dataflow_types[index],
                num_workers: num_workers[index],
            })
            .collect();

        Ok(ProcessConfig {
            processname,
            dataflow_type,
            processing_type,
            datasocket_type,
            data_lp_socket,
            data_hp_socket,
            command_socket,
            monitoring_socket,
            managers,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn required_str(record: &Value, process: &str, field: &'static str) -> Result<String, ConfigError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ConfigError::MissingField { process: process.to_string(), field })
}

fn required_enum<T: for<'de> Deserialize<'de>>(record: &Value, process: &str, field: &'static str) -> Result<T, ConfigError> {
    let raw = record.get(field).ok_or(ConfigError::MissingField { process: process.to_string(), field })?;
    serde_json::from_value(raw.clone()).map_err(|_| ConfigError::InvalidValue { field, value: raw.to_string() })
}

fn required_str_list(record: &Value, process: &str, field: &'static str) -> Result<Vec<String>, ConfigError> {
    record
        .get(field)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .ok_or(ConfigError::MissingField { process: process.to_string(), field })
}

fn required_enum_list<T: for<'de> Deserialize<'de>>(
    record: &Value,
    process: &str,
    field: &'static str,
) -> Result<Vec<T>, ConfigError> {
    let arr = record
        .get(field)
        .and_then(Value::as_array)
        .ok_or(ConfigError::MissingField { process: process.to_string(), field })?;
    arr.iter()
        .map(|v| serde_json::from_value(v.clone()).map_err(|_| ConfigError::InvalidValue { field, value: v.to_string() }))
        .collect()
}

fn required_u32_list(record: &Value, process: &str, field: &'static str) -> Result<Vec<u32>, ConfigError> {
    let arr = record
        .get(field)
        .and_then(Value::as_array)
        .ok_or(ConfigError::MissingField { process: process.to_string(), field })?;
    arr.iter()
        .map(|v| v.as_u64().map(|n| n as u32).ok_or_else(|| ConfigError::InvalidValue { field, value: v.to_string() }))
        .collect()
}

/// Rewrite a connect-style `tcp://host:port` address into its bind-side
/// counterpart `tcp://*:port`, as used for PULL endpoints.
pub fn to_bind_address(address: &str) -> Result<String, BindError> {
    let parts: Vec<&str> = address.split(':').collect();
    if parts.len() == 3 && parts[0] == "tcp" {
        Ok(format!("{}://*:{}", parts[0], parts[2]))
    } else {
        Err(BindError::MalformedAddress(address.to_string()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
