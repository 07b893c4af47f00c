// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rtadp-transport: ZeroMQ endpoint wrappers for the data, command,
//! monitoring, and result channels, plus in-memory test doubles behind the
//! `test-support` feature.

mod error;
mod traits;
mod zmq_backend;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use error::TransportError;
pub use traits::{CommandSource, DataSource, MonitoringSink, ResultSink};
pub use zmq_backend::{ZmqCommandSource, ZmqDataSource, ZmqMonitoringSink, ZmqResultSink, ZmqTransport};
