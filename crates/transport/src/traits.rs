// SPDX-License-Identifier: MIT

//! Endpoint traits. The supervisor and manager depend on these, not on
//! `zmq` directly, so tests can run against [`crate::fake`] doubles instead
//! of a live broker.

use std::sync::Arc;

use crate::error::TransportError;

/// Ingress for a low- or high-priority data stream.
pub trait DataSource: Send {
    fn recv_bytes(&self) -> Result<Vec<u8>, TransportError>;
    fn recv_string(&self) -> Result<String, TransportError>;
    /// Non-blocking poll, so the ingestion task can observe `stopdata` and
    /// shutdown between frames instead of blocking forever on a quiet
    /// socket (§4.I).
    fn try_recv_bytes(&self) -> Result<Option<Vec<u8>>, TransportError>;
    fn try_recv_string(&self) -> Result<Option<String>, TransportError>;
}

/// Ingress for the command channel.
pub trait CommandSource: Send {
    /// Block until a command frame arrives.
    fn recv_string(&self) -> Result<String, TransportError>;
    /// Non-blocking poll, for loops that also need to observe a shutdown
    /// signal between frames.
    fn try_recv_string(&self) -> Result<Option<String>, TransportError>;
}

/// Egress for the monitoring channel.
pub trait MonitoringSink: Send {
    fn send_string(&self, payload: &str) -> Result<(), TransportError>;
}

/// One monitoring socket is shared by every manager of a process; this
/// lets the supervisor hand each [`crate::MonitoringSink`] consumer its own
/// `Arc` clone of the same underlying endpoint.
impl<T: MonitoringSink + ?Sized> MonitoringSink for Arc<T> {
    fn send_string(&self, payload: &str) -> Result<(), TransportError> {
        (**self).send_string(payload)
    }
}

/// Egress for a manager's result channel.
pub trait ResultSink: Send {
    fn send_bytes(&self, payload: &[u8]) -> Result<(), TransportError>;
    fn send_string(&self, payload: &str) -> Result<(), TransportError>;
}
