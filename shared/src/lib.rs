//! Shared types for the Mangal ordering framework
//!
//! Common types used across the client and app crates: canonical entities,
//! raw-payload normalization, pricing rules, push-channel message types and
//! auth DTOs.

pub mod client;
pub mod message;
pub mod models;
pub mod normalize;
pub mod pricing;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, ChannelEvent, EventType, Room};

// Model re-exports
pub use models::{
    CateringRequest, MenuItem, OptionGroup, OptionItem, Order, OrderItem, OrderPatch, OrderStatus,
    StatusGroup, StoreStatus, WaitTimesConfig,
};
