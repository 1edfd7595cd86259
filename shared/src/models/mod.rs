//! Canonical data model
//!
//! Typed entities produced by the normalizer from loosely-typed backend
//! payloads. Wire payload structs for mutations live next to the entity they
//! belong to.

pub mod catering;
pub mod menu;
pub mod order;
pub mod serde_helpers;
pub mod store_status;
pub mod wait_times;

pub use catering::{CateringLayout, CateringRequest, CateringStatus, CateringSubmission, YesNo};
pub use menu::{MenuItem, MenuItemCreate, MenuItemUpdate, OptionGroup, OptionItem, OptionSelection};
pub use order::{
    Order, OrderItem, OrderPatch, OrderStatus, PaymentMethod, ServiceKind, StatusGroup,
};
pub use store_status::StoreStatus;
pub use wait_times::{WaitTimeSchedule, WaitTimesConfig};
