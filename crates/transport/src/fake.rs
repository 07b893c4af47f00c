// SPDX-License-Identifier: MIT

//! In-memory endpoint doubles, for exercising the supervisor/manager
//! pipeline without a live ZeroMQ broker.

use std::sync::mpsc;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::traits::{CommandSource, DataSource, MonitoringSink, ResultSink};

/// A [`DataSource`] fed by a test via [`FakeDataSource::sender`].
pub struct FakeDataSource {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl FakeDataSource {
    pub fn channel() -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl DataSource for FakeDataSource {
    fn recv_bytes(&self) -> Result<Vec<u8>, TransportError> {
        self.rx.recv().map_err(|e| TransportError::Recv(e.to_string()))
    }

    fn recv_string(&self) -> Result<String, TransportError> {
        let bytes = self.recv_bytes()?;
        String::from_utf8(bytes).map_err(|e| TransportError::Recv(e.to_string()))
    }

    fn try_recv_bytes(&self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.rx.try_recv() {
            Ok(bytes) => Ok(Some(bytes)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(e @ mpsc::TryRecvError::Disconnected) => Err(TransportError::Recv(e.to_string())),
        }
    }

    fn try_recv_string(&self) -> Result<Option<String>, TransportError> {
        match self.try_recv_bytes()? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| TransportError::Recv(e.to_string())),
            None => Ok(None),
        }
    }
}

/// A [`CommandSource`] fed by a test via [`FakeCommandSource::sender`].
pub struct FakeCommandSource {
    rx: mpsc::Receiver<String>,
}

impl FakeCommandSource {
    pub fn channel() -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl CommandSource for FakeCommandSource {
    fn recv_string(&self) -> Result<String, TransportError> {
        self.rx.recv().map_err(|e| TransportError::Recv(e.to_string()))
    }

    fn try_recv_string(&self) -> Result<Option<String>, TransportError> {
        match self.rx.try_recv() {
            Ok(text) => Ok(Some(text)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(e @ mpsc::TryRecvError::Disconnected) => Err(TransportError::Recv(e.to_string())),
        }
    }
}

/// A [`MonitoringSink`] that records every published snapshot for
/// assertions.
#[derive(Clone, Default)]
pub struct FakeMonitoringSink {
    sent: Arc<Mutex<Vec<String>>>,
}

impl FakeMonitoringSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

impl MonitoringSink for FakeMonitoringSink {
    fn send_string(&self, payload: &str) -> Result<(), TransportError> {
        self.sent.lock().push(payload.to_string());
        Ok(())
    }
}

/// A [`ResultSink`] that records every published result for assertions.
#[derive(Clone, Default)]
pub struct FakeResultSink {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl FakeResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }
}

impl ResultSink for FakeResultSink {
    fn send_bytes(&self, payload: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().push(payload.to_vec());
        Ok(())
    }

    fn send_string(&self, payload: &str) -> Result<(), TransportError> {
        self.send_bytes(payload.as_bytes())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
