// SPDX-License-Identifier: MIT

//! Error taxonomy for the supervisor runtime.
//!
//! Each variant maps to one failure mode named in the component design:
//! startup errors (`ConfigError`, `BindError`) are fatal and abort the
//! process; per-payload errors (`DecodeError`, `ProcessingError`,
//! `SendError`, `ProtocolError`) are recovered locally by the caller
//! (logged, payload dropped) and never unwind out of a worker or
//! ingestion loop.

use std::path::PathBuf;

use thiserror::Error;

/// Failure loading or looking up a process configuration record.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {path} must contain a top-level array of process records")]
    NotAnArray { path: PathBuf },

    #[error("no process configuration named '{0}'")]
    NotFound(String),

    #[error("process '{process}' is missing required field '{field}'")]
    MissingField { process: String, field: &'static str },

    #[error("process '{process}' field '{field}' has mismatched list length {got} (expected {expected})")]
    MismatchedListLength { process: String, field: &'static str, got: usize, expected: usize },

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: &'static str, value: String },
}

/// Failure acquiring a transport endpoint. Fatal: aborts supervisor startup.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("failed to bind {address}: {reason}")]
    Bind { address: String, reason: String },

    #[error("failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("malformed endpoint address '{0}'")]
    MalformedAddress(String),
}

/// A user `decode_data` hook failed. Logged and the payload is dropped.
#[derive(Debug, Error)]
#[error("decode_data failed: {0}")]
pub struct DecodeError(pub String);

/// A user `process_data` hook failed. Logged; the worker keeps running.
#[derive(Debug, Error)]
#[error("process_data failed: {0}")]
pub struct ProcessingError(pub String);

/// A result failed to send on a manager's egress socket. Logged and dropped.
#[derive(Debug, Error)]
#[error("send failed: {0}")]
pub struct SendError(pub String);

/// A command message was malformed or unparsable. Logged and ignored.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("command is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("command is missing required header field '{0}'")]
    MissingHeaderField(&'static str),

    #[error("unknown command subtype '{0}'")]
    UnknownSubtype(String),
}
