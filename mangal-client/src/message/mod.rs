//! Push-channel client
//!
//! Event subscription for order/catering/driver pushes. The wire format is a
//! small binary frame (event byte, request id, correlation id,
//! length-prefixed JSON payload) shared with the backend channel server.

pub mod client;
pub mod transport;

pub use client::MessageClient;
pub use transport::{MemoryTransport, TcpTransport, Transport};

use thiserror::Error;

/// Message layer error type
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}
