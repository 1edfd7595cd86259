//! Role-scoped view composition
//!
//! Decides which admin panels a role sees and where it lands after login.
//! This is composition only, not authorization: the backend enforces every
//! privileged action, the client merely hides controls that would fail.

use serde::{Deserialize, Serialize};
use shared::models::order::{Order, OrderStatus, StatusGroup};

/// Admin privilege levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Elevated: full console
    Admin,
    Cashier,
    Kitchen,
}

impl Role {
    /// Parse a backend role string; unknown values degrade to the least
    /// privileged role.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ADMIN" => Self::Admin,
            "CASHIER" => Self::Cashier,
            "KITCHEN" => Self::Kitchen,
            other => {
                tracing::warn!("unknown role {:?}, degrading to kitchen", other);
                Self::Kitchen
            }
        }
    }
}

/// Admin console panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Overview,
    Orders,
    Menu,
    Inventory,
    WaitTimes,
    History,
    Catering,
    Settings,
}

/// What the menu panel exposes for a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAccess {
    /// Full CRUD
    Full,
    /// Order-entry view only
    OrderEntry,
    None,
}

impl Role {
    /// Panels this role sees, in display order
    pub fn visible_panels(self) -> Vec<Panel> {
        match self {
            Role::Admin => vec![
                Panel::Overview,
                Panel::Orders,
                Panel::Menu,
                Panel::Inventory,
                Panel::WaitTimes,
                Panel::History,
                Panel::Catering,
                Panel::Settings,
            ],
            Role::Cashier => vec![Panel::Orders, Panel::Menu, Panel::WaitTimes],
            Role::Kitchen => vec![Panel::Orders],
        }
    }

    /// Landing tab after login
    pub fn default_panel(self) -> Panel {
        match self {
            Role::Admin => Panel::Overview,
            Role::Cashier | Role::Kitchen => Panel::Orders,
        }
    }

    pub fn sees_panel(self, panel: Panel) -> bool {
        self.visible_panels().contains(&panel)
    }

    pub fn menu_access(self) -> MenuAccess {
        match self {
            Role::Admin => MenuAccess::Full,
            Role::Cashier => MenuAccess::OrderEntry,
            Role::Kitchen => MenuAccess::None,
        }
    }

    pub fn can_edit_wait_times(self) -> bool {
        matches!(self, Role::Admin | Role::Cashier)
    }

    /// Order visibility in the orders panel. The kitchen sees only orders it
    /// still has to cook; the others also keep READY-but-unpaid orders on
    /// screen until settled.
    pub fn sees_order(self, order: &Order) -> bool {
        match self {
            Role::Kitchen => matches!(
                order.status.group(),
                StatusGroup::AwaitingAcceptance | StatusGroup::InProgress
            ),
            Role::Admin | Role::Cashier => {
                order.status.is_active()
                    || (order.status == OrderStatus::Ready && order.paid != Some(true))
            }
        }
    }
}
