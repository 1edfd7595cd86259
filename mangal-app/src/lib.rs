//! Mangal App - UI-state layer of the ordering frontend
//!
//! Everything the views bind to, minus the markup: cart and checkout,
//! live order tracking, the admin order board, role-scoped view composition,
//! the store-status gate and the driver location pusher. All durable state
//! lives server-side; this crate only holds per-session view state.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod driver;
pub mod logger;
pub mod roles;
pub mod session;
pub mod store_gate;
pub mod tracker;
pub mod validate;

pub use admin::{BoardSubscription, OrderBoard};
pub use cart::{CartLine, CartStore};
pub use config::AppConfig;
pub use roles::{MenuAccess, Panel, Role};
pub use store_gate::StoreStatusGate;
pub use tracker::{OrderTracker, Remaining, TrackerEvent, TrackerSubscription};

#[cfg(test)]
pub(crate) mod test_support;
