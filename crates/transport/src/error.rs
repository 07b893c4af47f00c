// SPDX-License-Identifier: MIT

use rtadp_core::BindError;
use thiserror::Error;

/// Failure acquiring or using a transport endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("socket setup failed: {0}")]
    Setup(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("recv failed: {0}")]
    Recv(String),
}
