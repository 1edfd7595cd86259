//! Mangal Client - backend boundary for the ordering frontend
//!
//! Provides network-based HTTP calls to the ordering backend API and a
//! message client for the push channel.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod message;

pub use api::Api;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};

// Message types and clients
pub use message::{MessageClient, MessageError};

// Re-export shared types for convenience
pub use shared::message::{BusMessage, ChannelEvent, EventType, Room};
