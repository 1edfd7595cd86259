//! Store Status Model

use serde::{Deserialize, Serialize};

/// Online-ordering open/closed flag with an optional operator message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub online_orders_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Default for StoreStatus {
    fn default() -> Self {
        Self {
            online_orders_open: true,
            message: None,
        }
    }
}
