// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rtadp-core: shared data model, configuration, and error types for the
//! telescope data-acquisition supervisor runtime.

pub mod clock;
pub mod config;
pub mod error;
pub mod payload;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{to_bind_address, ConfigStore, DataflowType, ProcessConfig, ProcessingType, SocketType};
pub use error::{BindError, ConfigError, DecodeError, ProcessingError, ProtocolError, SendError};
pub use payload::{Payload, Priority};
pub use state::{ManagerState, SupervisorState, WorkerStatus};
