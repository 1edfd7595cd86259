//! Order Model

use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

use super::menu::OptionSelection;

/// Order status as delivered by the backend.
///
/// `PREPARING`/`IN_KITCHEN` and `CANCELLED`/`CANCELED` are display synonyms
/// but distinct wire values: the original string round-trips on re-serialize,
/// only [`StatusGroup`] collapses them. Unknown values are preserved in
/// `Other` so novel backend states never fail deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Received,
    Accepted,
    Preparing,
    InKitchen,
    Ready,
    OutForDelivery,
    Delivered,
    Rejected,
    Cancelled,
    Canceled,
    Other(String),
}

/// Display grouping of [`OrderStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGroup {
    AwaitingAcceptance,
    InProgress,
    Ready,
    Terminal,
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Received => "RECEIVED",
            Self::Accepted => "ACCEPTED",
            Self::Preparing => "PREPARING",
            Self::InKitchen => "IN_KITCHEN",
            Self::Ready => "READY",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Canceled => "CANCELED",
            Self::Other(raw) => raw,
        }
    }

    pub fn group(&self) -> StatusGroup {
        match self {
            Self::Pending | Self::Received => StatusGroup::AwaitingAcceptance,
            Self::Accepted | Self::Preparing | Self::InKitchen | Self::OutForDelivery => {
                StatusGroup::InProgress
            }
            Self::Ready => StatusGroup::Ready,
            Self::Delivered | Self::Rejected | Self::Cancelled | Self::Canceled => {
                StatusGroup::Terminal
            }
            // Unknown states have not been accepted as far as we can tell
            Self::Other(_) => StatusGroup::AwaitingAcceptance,
        }
    }

    /// Active from the admin board's point of view (READY is handled
    /// separately: it stays visible only while unpaid).
    pub fn is_active(&self) -> bool {
        matches!(
            self.group(),
            StatusGroup::AwaitingAcceptance | StatusGroup::InProgress
        ) && !matches!(self, Self::Other(_))
    }

    pub fn is_terminal(&self) -> bool {
        self.group() == StatusGroup::Terminal
    }

    /// Customer-facing label (Swedish)
    pub fn label(&self) -> String {
        match self {
            Self::Pending => "Väntar".into(),
            Self::Received => "Mottagen".into(),
            Self::Accepted => "Accepterad".into(),
            Self::Preparing | Self::InKitchen => "Tillagar".into(),
            Self::Ready => "Klar".into(),
            Self::OutForDelivery => "På väg".into(),
            Self::Delivered => "Levererad".into(),
            Self::Rejected => "Avvisad".into(),
            Self::Cancelled | Self::Canceled => "Avbruten".into(),
            Self::Other(raw) => raw.replace('_', " "),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "PENDING" => Self::Pending,
            "RECEIVED" => Self::Received,
            "ACCEPTED" => Self::Accepted,
            "PREPARING" => Self::Preparing,
            "IN_KITCHEN" => Self::InKitchen,
            "READY" => Self::Ready,
            "OUT_FOR_DELIVERY" => Self::OutForDelivery,
            "DELIVERED" => Self::Delivered,
            "REJECTED" => Self::Rejected,
            "CANCELLED" => Self::Cancelled,
            "CANCELED" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
}

/// Logical service kind derived from the raw method/type strings
///
/// The wire carries both `TAKE_AWAY` (legacy) and `TAKEAWAY` (backend); both
/// map here while [`Order::method`] keeps the raw string for round-tripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    DineIn,
    Takeaway,
    Delivery,
}

impl ServiceKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DINE_IN" => Some(Self::DineIn),
            "TAKEAWAY" | "TAKE_AWAY" => Some(Self::Takeaway),
            "DELIVERY" => Some(Self::Delivery),
            _ => None,
        }
    }
}

/// Order line as stored on an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item_id: String,
    pub name: String,
    /// Price at order time, raw currency unit
    pub price: i64,
    pub qty: i64,
}

/// Canonical order entity
///
/// One logical view derived from either historical wire shape; produced by
/// [`crate::normalize::normalize_order`], never constructed from raw JSON
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<i64>,
    /// Raw method/type string (`DINE_IN`, `TAKE_AWAY`, `TAKEAWAY`, `DELIVERY`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_wait_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_google_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_location: Option<GeoPoint>,
    pub created_at: String,
}

impl Order {
    pub fn service_kind(&self) -> Option<ServiceKind> {
        self.method.as_deref().and_then(ServiceKind::parse)
    }

    /// Amount to present for this order: backend total, then legacy subtotal,
    /// then the sum of its lines (raw unit, not display-converted).
    pub fn raw_total(&self) -> i64 {
        self.total
            .or(self.subtotal)
            .unwrap_or_else(|| self.items.iter().map(|it| it.price * it.qty).sum())
    }

    /// Shallow merge: fields present in the patch overwrite, everything else
    /// retains its previous value.
    pub fn apply_patch(&mut self, patch: &OrderPatch) {
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(items) = &patch.items {
            self.items = items.clone();
        }
        merge(&mut self.subtotal, &patch.subtotal);
        merge(&mut self.method, &patch.method);
        merge(&mut self.total, &patch.total);
        merge(&mut self.customer_name, &patch.customer_name);
        merge(&mut self.phone, &patch.phone);
        merge(&mut self.email, &patch.email);
        merge(&mut self.eta_minutes, &patch.eta_minutes);
        merge(&mut self.estimated_wait_minutes, &patch.estimated_wait_minutes);
        merge(&mut self.accepted_at, &patch.accepted_at);
        merge(&mut self.ready_at, &patch.ready_at);
        merge(&mut self.paid, &patch.paid);
        merge(&mut self.payment_method, &patch.payment_method);
        merge(&mut self.note, &patch.note);
        merge(&mut self.order_number, &patch.order_number);
        merge(&mut self.driver_google_email, &patch.driver_google_email);
        merge(&mut self.driver_location, &patch.driver_location);
    }
}

/// Overwrite `dst` only when the patch carries a value
fn merge<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if src.is_some() {
        *dst = src.clone();
    }
}

/// Partial order update as delivered by the push channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_wait_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_google_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_location: Option<GeoPoint>,
}

// =============================================================================
// Mutation payloads (client -> backend)
// =============================================================================

/// Customer block of the legacy basket-shaped creation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCustomer {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

/// Legacy basket-shaped order creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyOrderCreate {
    pub items: Vec<OrderItem>,
    /// Raw method string (`DINE_IN`, `TAKE_AWAY`, `DELIVERY`)
    pub method: String,
    pub customer: LegacyCustomer,
}

/// Versioned order creation: service kind the backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    DineIn,
    Takeaway,
}

/// Option selection as sent on the wire (quantities clamped to integers >= 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOptionSelection {
    pub group_id: String,
    pub option_id: String,
    pub quantity: u32,
}

impl From<&OptionSelection> for WireOptionSelection {
    fn from(sel: &OptionSelection) -> Self {
        Self {
            group_id: sel.group_id.clone(),
            option_id: sel.option_id.clone(),
            quantity: (sel.quantity.round().max(1.0)) as u32,
        }
    }
}

/// Versioned order creation line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateItem {
    pub menu_item_id: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_options: Vec<WireOptionSelection>,
}

/// Versioned order creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderCreateItem>,
    pub customer_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

/// Order creation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_number: Option<String>,
}

/// Accept payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<i64>,
}

/// Reject payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Status update payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

/// Paid toggle payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetOrderPaid {
    pub paid: bool,
}

// =============================================================================
// Overview statistics (admin)
// =============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PeriodStats {
    pub orders: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    #[serde(default)]
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub day: PeriodStats,
    pub week: PeriodStats,
    pub month: PeriodStats,
    #[serde(default)]
    pub top_items: Vec<TopItem>,
}
