// SPDX-License-Identifier: MIT

//! Extension points a concrete processor plugs domain logic into.
//!
//! A domain-specific binary implements [`Hooks`] and hands it to
//! [`crate::supervisor::Supervisor::new`]; everything else in this crate
//! (ingestion, queues, workers, monitoring, shutdown) is generic over it.
//! The default (identity) implementations in [`IdentityHooks`] make the
//! crate runnable and testable standalone before any concrete subclass
//! plugs in decoding and analysis code.

use rtadp_core::error::{DecodeError, ProcessingError};
use rtadp_core::{Payload, Priority};

/// User-supplied hooks invoked by the ingestion tasks and workers.
///
/// Implementations must be cheap to clone (one instance is shared across
/// every ingestion task, manager, and worker) and safe to call from
/// multiple threads concurrently.
pub trait Hooks: Clone + Send + Sync + 'static {
    /// Transforms a raw binary frame into a payload before it is enqueued.
    /// Default: identity (wrap the bytes as-is).
    fn decode_data(&self, bytes: Vec<u8>) -> Result<Payload, DecodeError> {
        Ok(Payload::Binary(bytes))
    }

    /// Expands a filename into the sequence of payloads it names. Default:
    /// the filename itself is the sole item.
    fn open_file(&self, name: &str) -> Result<Vec<Payload>, DecodeError> {
        Ok(vec![Payload::Text(name.to_string())])
    }

    /// The worker's business logic: consumes one payload from either
    /// priority class and produces the result to publish on the manager's
    /// egress channel. Errors are logged by the caller and the payload is
    /// dropped; they must never terminate the worker.
    fn process_data(&self, payload: Payload, priority: Priority) -> Result<Payload, ProcessingError>;

    /// Applies a dynamic configuration message to a running worker.
    /// Default: no-op (ignore the message).
    fn config(&self, _message: &str) {}
}

/// Pass-through hooks: `decode_data`/`open_file` are identity, and
/// `process_data` returns its input unchanged. Useful for exercising the
/// supervisor/manager/worker pipeline before any domain logic exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHooks;

impl Hooks for IdentityHooks {
    fn process_data(&self, payload: Payload, _priority: Priority) -> Result<Payload, ProcessingError> {
        Ok(payload)
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
