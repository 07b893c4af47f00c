// SPDX-License-Identifier: MIT

//! Command messages received on a supervisor's command socket.

use rtadp_core::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `header` object of a command message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHeader {
    pub subtype: Subtype,
    pub pidtarget: String,
    pub pidsource: String,
}

/// A parsed command, as received on the command socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    pub header: CommandHeader,
}

/// The command verb, carried as `header.subtype` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subtype {
    Start,
    Stop,
    Stopdata,
    Startdata,
    Reset,
    Getstatus,
    Shutdown,
    Cleanedshutdown,
}

impl CommandMessage {
    /// Does this command target `process_name`? Matches the original
    /// broadcast aliases `"all"` and `"*"` in addition to an exact name.
    pub fn targets(&self, process_name: &str) -> bool {
        let target = self.header.pidtarget.as_str();
        target == process_name || target == "all" || target == "*"
    }

    /// Parse a raw command frame. Field-by-field so that the first missing
    /// or malformed field is reported, rather than a generic deserialize
    /// failure.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(raw)?;
        let header = value.get("header").ok_or(ProtocolError::MissingHeaderField("header"))?;

        let subtype_raw = header.get("subtype").and_then(Value::as_str).ok_or(ProtocolError::MissingHeaderField("subtype"))?;
        let subtype = subtype_from_str(subtype_raw)?;

        let pidtarget = header
            .get("pidtarget")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingHeaderField("pidtarget"))?
            .to_string();
        let pidsource = header
            .get("pidsource")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingHeaderField("pidsource"))?
            .to_string();

        Ok(CommandMessage { header: CommandHeader { subtype, pidtarget, pidsource } })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn subtype_from_str(raw: &str) -> Result<Subtype, ProtocolError> {
    match raw {
        "start" => Ok(Subtype::Start),
        "stop" => Ok(Subtype::Stop),
        "stopdata" => Ok(Subtype::Stopdata),
        "startdata" => Ok(Subtype::Startdata),
        "reset" => Ok(Subtype::Reset),
        "getstatus" => Ok(Subtype::Getstatus),
        "shutdown" => Ok(Subtype::Shutdown),
        "cleanedshutdown" => Ok(Subtype::Cleanedshutdown),
        other => Err(ProtocolError::UnknownSubtype(other.to_string())),
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
