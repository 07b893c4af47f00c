// SPDX-License-Identifier: MIT

//! ZeroMQ-backed endpoint implementations.
//!
//! Socket flavor follows `datasocket_type`/`manager_result_socket_type`:
//! `pushpull` binds a PULL for ingress or connects a PUSH for egress;
//! `pubsub` connects a SUB (subscribed to all topics) for ingress or binds
//! a PUB for egress. Command channels are always SUB, subscribed to all
//! topics, regardless of `datasocket_type`.

use rtadp_core::{to_bind_address, SocketType};
use tracing::debug;

use crate::error::TransportError;
use crate::traits::{CommandSource, DataSource, MonitoringSink, ResultSink};

/// Owns the `zmq::Context` shared by every socket a process opens.
#[derive(Clone)]
pub struct ZmqTransport {
    context: zmq::Context,
}

impl Default for ZmqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ZmqTransport {
    pub fn new() -> Self {
        Self { context: zmq::Context::new() }
    }

    /// Open an ingress data endpoint. `pushpull` binds PULL at the
    /// bind-side rewrite of `address`; `pubsub` connects SUB and
    /// subscribes to all topics.
    pub fn open_data_source(&self, socket_type: SocketType, address: &str) -> Result<ZmqDataSource, TransportError> {
        let socket = match socket_type {
            SocketType::Pushpull => {
                let bind_address = to_bind_address(address)?;
                let socket = self.context.socket(zmq::PULL).map_err(|e| TransportError::Setup(e.to_string()))?;
                socket.bind(&bind_address).map_err(|e| TransportError::Bind(rtadp_core::BindError::Bind {
                    address: bind_address,
                    reason: e.to_string(),
                }))?;
                socket
            }
            SocketType::Pubsub => {
                let socket = self.context.socket(zmq::SUB).map_err(|e| TransportError::Setup(e.to_string()))?;
                socket.connect(address).map_err(|e| TransportError::Bind(rtadp_core::BindError::Connect {
                    address: address.to_string(),
                    reason: e.to_string(),
                }))?;
                socket.set_subscribe(b"").map_err(|e| TransportError::Setup(e.to_string()))?;
                socket
            }
        };
        debug!(%address, ?socket_type, "opened data source");
        Ok(ZmqDataSource { socket })
    }

    /// Open the command channel: always SUB, connected and subscribed to
    /// all topics.
    pub fn open_command_source(&self, address: &str) -> Result<ZmqCommandSource, TransportError> {
        let socket = self.context.socket(zmq::SUB).map_err(|e| TransportError::Setup(e.to_string()))?;
        socket.connect(address).map_err(|e| TransportError::Bind(rtadp_core::BindError::Connect {
            address: address.to_string(),
            reason: e.to_string(),
        }))?;
        socket.set_subscribe(b"").map_err(|e| TransportError::Setup(e.to_string()))?;
        debug!(%address, "opened command source");
        Ok(ZmqCommandSource { socket })
    }

    /// Open the monitoring channel: always PUSH, connected to the
    /// collector.
    pub fn open_monitoring_sink(&self, address: &str) -> Result<ZmqMonitoringSink, TransportError> {
        let socket = self.context.socket(zmq::PUSH).map_err(|e| TransportError::Setup(e.to_string()))?;
        socket.connect(address).map_err(|e| TransportError::Bind(rtadp_core::BindError::Connect {
            address: address.to_string(),
            reason: e.to_string(),
        }))?;
        debug!(%address, "opened monitoring sink");
        Ok(ZmqMonitoringSink { socket })
    }

    /// Open a manager's result egress endpoint. `pushpull` connects PUSH;
    /// `pubsub` binds PUB.
    pub fn open_result_sink(&self, socket_type: SocketType, address: &str) -> Result<ZmqResultSink, TransportError> {
        let socket = match socket_type {
            SocketType::Pushpull => {
                let socket = self.context.socket(zmq::PUSH).map_err(|e| TransportError::Setup(e.to_string()))?;
                socket.connect(address).map_err(|e| TransportError::Bind(rtadp_core::BindError::Connect {
                    address: address.to_string(),
                    reason: e.to_string(),
                }))?;
                socket
            }
            SocketType::Pubsub => {
                let bind_address = to_bind_address(address)?;
                let socket = self.context.socket(zmq::PUB).map_err(|e| TransportError::Setup(e.to_string()))?;
                socket.bind(&bind_address).map_err(|e| TransportError::Bind(rtadp_core::BindError::Bind {
                    address: bind_address,
                    reason: e.to_string(),
                }))?;
                socket
            }
        };
        debug!(%address, ?socket_type, "opened result sink");
        Ok(ZmqResultSink { socket })
    }
}

pub struct ZmqDataSource {
    socket: zmq::Socket,
}

impl DataSource for ZmqDataSource {
    fn recv_bytes(&self) -> Result<Vec<u8>, TransportError> {
        self.socket.recv_bytes(0).map_err(|e| TransportError::Recv(e.to_string()))
    }

    fn recv_string(&self) -> Result<String, TransportError> {
        self.socket
            .recv_string(0)
            .map_err(|e| TransportError::Recv(e.to_string()))?
            .map_err(|_| TransportError::Recv("payload is not valid UTF-8".to_string()))
    }

    fn try_recv_bytes(&self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.socket.recv_bytes(zmq::DONTWAIT) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(TransportError::Recv(e.to_string())),
        }
    }

    fn try_recv_string(&self) -> Result<Option<String>, TransportError> {
        match self.socket.recv_string(zmq::DONTWAIT) {
            Ok(Ok(text)) => Ok(Some(text)),
            Ok(Err(_)) => Err(TransportError::Recv("payload is not valid UTF-8".to_string())),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(TransportError::Recv(e.to_string())),
        }
    }
}

pub struct ZmqCommandSource {
    socket: zmq::Socket,
}

impl CommandSource for ZmqCommandSource {
    fn recv_string(&self) -> Result<String, TransportError> {
        self.socket
            .recv_string(0)
            .map_err(|e| TransportError::Recv(e.to_string()))?
            .map_err(|_| TransportError::Recv("payload is not valid UTF-8".to_string()))
    }

    fn try_recv_string(&self) -> Result<Option<String>, TransportError> {
        match self.socket.recv_string(zmq::DONTWAIT) {
            Ok(Ok(text)) => Ok(Some(text)),
            Ok(Err(_)) => Err(TransportError::Recv("payload is not valid UTF-8".to_string())),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(TransportError::Recv(e.to_string())),
        }
    }
}

pub struct ZmqMonitoringSink {
    socket: zmq::Socket,
}

impl MonitoringSink for ZmqMonitoringSink {
    fn send_string(&self, payload: &str) -> Result<(), TransportError> {
        self.socket.send(payload, 0).map_err(|e| TransportError::Send(e.to_string()))
    }
}

pub struct ZmqResultSink {
    socket: zmq::Socket,
}

impl ResultSink for ZmqResultSink {
    fn send_bytes(&self, payload: &[u8]) -> Result<(), TransportError> {
        self.socket.send(payload, 0).map_err(|e| TransportError::Send(e.to_string()))
    }

    fn send_string(&self, payload: &str) -> Result<(), TransportError> {
        self.socket.send(payload, 0).map_err(|e| TransportError::Send(e.to_string()))
    }
}
