// SPDX-License-Identifier: MIT

//! rtadp-wire: JSON wire types for the command and monitoring channels.
//!
//! Wire format: UTF-8 JSON, one message per ZeroMQ frame. No length prefix —
//! each socket flavor already delimits messages at the transport layer.

mod command;
mod monitoring;

pub use command::{CommandHeader, CommandMessage, Subtype};
pub use monitoring::{MonitoringHeader, MonitoringSnapshot, ProcInfo};
