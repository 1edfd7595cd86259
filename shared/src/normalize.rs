//! Raw payload normalization
//!
//! The backend is loosely typed and has shipped several historical field
//! names for the same thing (`id`/`_id`/`itemId`, `qty`/`quantity`,
//! `price`/`priceAtOrder`). Everything that crosses the wire goes through
//! these total functions: missing or malformed fields degrade to safe
//! defaults, malformed arrays normalize to empty lists, and nothing in this
//! module can fail.

use serde_json::Value;

use crate::models::catering::{CateringLayout, CateringRequest, CateringStatus, YesNo};
use crate::models::menu::{FALLBACK_CATEGORY, MenuItem, OptionGroup, OptionItem};
use crate::models::order::{Order, OrderItem, OrderPatch, OrderStatus, PaymentMethod};
use crate::types::GeoPoint;
use crate::util::now_rfc3339;

// =============================================================================
// Candidate-field resolution
// =============================================================================

/// String form of a scalar value, `None` for null/objects/arrays.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolve an identifier from an ordered list of candidate fields.
///
/// The first candidate whose string form is non-empty and not the literal
/// `"null"`/`"undefined"` wins; otherwise the canonical id is empty.
pub fn resolve_id(raw: &Value, candidates: &[&str]) -> String {
    for field in candidates {
        if let Some(s) = raw.get(field).and_then(scalar_string) {
            let lowered = s.to_lowercase();
            if !s.is_empty() && lowered != "null" && lowered != "undefined" {
                return s;
            }
        }
    }
    String::new()
}

/// Resolve an integer from ordered candidates, defaulting when every
/// candidate is absent or non-numeric. Numeric strings count as numbers.
pub fn resolve_i64(raw: &Value, candidates: &[&str], default: i64) -> i64 {
    for field in candidates {
        match raw.get(field) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    return v;
                }
                if let Some(v) = n.as_f64() {
                    return v.round() as i64;
                }
            }
            Some(Value::String(s)) => {
                if let Ok(v) = s.trim().parse::<f64>() {
                    return v.round() as i64;
                }
            }
            _ => {}
        }
    }
    default
}

/// Resolve an optional integer: first numeric candidate, else `None`.
pub fn resolve_opt_i64(raw: &Value, candidates: &[&str]) -> Option<i64> {
    for field in candidates {
        if let Some(n) = raw.get(field).and_then(Value::as_i64) {
            return Some(n);
        }
        if let Some(f) = raw.get(field).and_then(Value::as_f64) {
            return Some(f.round() as i64);
        }
    }
    None
}

/// Resolve an optional non-empty string from ordered candidates.
pub fn resolve_string(raw: &Value, candidates: &[&str]) -> Option<String> {
    for field in candidates {
        if let Some(s) = raw.get(field).and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

fn string_at(raw: &Value, pointer: &str) -> Option<String> {
    raw.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn array<'a>(raw: &'a Value, field: &str) -> &'a [Value] {
    raw.get(field).and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

// =============================================================================
// Menu
// =============================================================================

/// Normalize a raw menu item record into the canonical entity.
pub fn normalize_menu_item(raw: &Value) -> MenuItem {
    MenuItem {
        id: resolve_id(raw, &["id", "_id", "itemId"]),
        name: resolve_string(raw, &["name"]).unwrap_or_default(),
        price: resolve_i64(raw, &["price"], 0),
        category: resolve_string(raw, &["category"])
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
        description: resolve_string(raw, &["description"]),
        image_url: resolve_string(raw, &["imageUrl", "image"]),
        is_available: raw.get("isAvailable").and_then(Value::as_bool) != Some(false),
        option_groups: array(raw, "optionGroups")
            .iter()
            .map(normalize_option_group)
            .collect(),
    }
}

fn normalize_option_group(raw: &Value) -> OptionGroup {
    OptionGroup {
        // groups historically carry Mongo-style `_id` first
        id: resolve_id(raw, &["_id", "id"]),
        name: resolve_string(raw, &["name"]).unwrap_or_default(),
        min: resolve_opt_i64(raw, &["min"]).map(|v| v.max(0) as u32),
        max: resolve_opt_i64(raw, &["max"]).map(|v| v.max(0) as u32),
        allow_half: raw.get("allowHalf").and_then(Value::as_bool) == Some(true),
        options: array(raw, "options").iter().map(normalize_option).collect(),
    }
}

fn normalize_option(raw: &Value) -> OptionItem {
    OptionItem {
        id: resolve_id(raw, &["_id", "id"]),
        name: resolve_string(raw, &["name"]).unwrap_or_default(),
        price_delta: resolve_opt_i64(raw, &["priceDelta"]),
        half_price_delta: resolve_opt_i64(raw, &["halfPriceDelta"]),
        is_available: raw.get("isAvailable").and_then(Value::as_bool) != Some(false),
    }
}

// =============================================================================
// Orders
// =============================================================================

fn normalize_order_item(raw: &Value) -> OrderItem {
    OrderItem {
        item_id: resolve_id(raw, &["itemId", "menuItemId", "id"]),
        name: resolve_string(raw, &["name"]).unwrap_or_default(),
        price: resolve_i64(raw, &["price", "priceAtOrder"], 0),
        qty: resolve_i64(raw, &["qty", "quantity"], 1),
    }
}

fn normalize_status(raw: &Value) -> OrderStatus {
    raw.get("status")
        .and_then(Value::as_str)
        .map(OrderStatus::from)
        .unwrap_or(OrderStatus::Pending)
}

fn normalize_payment_method(raw: &Value) -> Option<PaymentMethod> {
    match raw.get("paymentMethod").and_then(Value::as_str) {
        Some("CASH") => Some(PaymentMethod::Cash),
        Some("CARD") => Some(PaymentMethod::Card),
        _ => None,
    }
}

fn normalize_geo(raw: &Value, field: &str) -> Option<GeoPoint> {
    let loc = raw.get(field)?;
    Some(GeoPoint {
        lat: loc.get("lat").and_then(Value::as_f64)?,
        lng: loc.get("lng").and_then(Value::as_f64)?,
    })
}

/// Normalize a raw order of either historical shape (legacy basket or
/// versioned backend) into the single canonical [`Order`].
pub fn normalize_order(raw: &Value) -> Order {
    Order {
        id: resolve_id(raw, &["id", "_id", "orderId"]),
        items: array(raw, "items").iter().map(normalize_order_item).collect(),
        subtotal: raw.get("subtotal").and_then(Value::as_i64),
        // the backend shape calls it `type`, the legacy shape `method`
        method: resolve_string(raw, &["type", "method"]),
        total: raw.get("total").and_then(Value::as_i64),
        customer_name: resolve_string(raw, &["customerName"])
            .or_else(|| string_at(raw, "/customer/name")),
        phone: resolve_string(raw, &["phone"]).or_else(|| string_at(raw, "/customer/phone")),
        email: resolve_string(raw, &["email"]).or_else(|| string_at(raw, "/customer/email")),
        status: normalize_status(raw),
        eta_minutes: raw.get("etaMinutes").and_then(Value::as_i64),
        estimated_wait_minutes: raw.get("estimatedWaitMinutes").and_then(Value::as_i64),
        accepted_at: resolve_string(raw, &["acceptedAt"]),
        ready_at: resolve_string(raw, &["readyAt"]),
        paid: raw.get("paid").and_then(Value::as_bool),
        payment_method: normalize_payment_method(raw),
        note: resolve_string(raw, &["note"])
            .or_else(|| string_at(raw, "/customer/notes"))
            .or_else(|| string_at(raw, "/customer/note")),
        order_number: resolve_string(raw, &["orderNumber"]),
        driver_google_email: resolve_string(raw, &["driverGoogleEmail"]),
        driver_location: normalize_geo(raw, "driverLocation"),
        created_at: resolve_string(raw, &["createdAt"]).unwrap_or_else(now_rfc3339),
    }
}

/// Normalize a push-channel partial update into an [`OrderPatch`].
///
/// Unlike [`normalize_order`] nothing defaults here: only fields the payload
/// actually carries are set, so shallow merges keep everything else intact.
pub fn normalize_order_patch(raw: &Value) -> OrderPatch {
    let id = resolve_id(raw, &["_id", "id"]);
    OrderPatch {
        id: (!id.is_empty()).then_some(id),
        status: raw
            .get("status")
            .and_then(Value::as_str)
            .map(OrderStatus::from),
        items: raw
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize_order_item).collect()),
        subtotal: raw.get("subtotal").and_then(Value::as_i64),
        method: resolve_string(raw, &["type", "method"]),
        total: raw.get("total").and_then(Value::as_i64),
        customer_name: resolve_string(raw, &["customerName"]),
        phone: resolve_string(raw, &["phone"]),
        email: resolve_string(raw, &["email"]),
        eta_minutes: raw.get("etaMinutes").and_then(Value::as_i64),
        estimated_wait_minutes: raw.get("estimatedWaitMinutes").and_then(Value::as_i64),
        accepted_at: resolve_string(raw, &["acceptedAt"]),
        ready_at: resolve_string(raw, &["readyAt"]),
        paid: raw.get("paid").and_then(Value::as_bool),
        payment_method: normalize_payment_method(raw),
        note: resolve_string(raw, &["note"]),
        order_number: resolve_string(raw, &["orderNumber"]),
        driver_google_email: resolve_string(raw, &["driverGoogleEmail"]),
        driver_location: normalize_geo(raw, "driverLocation"),
    }
}

// =============================================================================
// Catering
// =============================================================================

fn normalize_catering_status(raw: &Value) -> CateringStatus {
    raw.get("status")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

fn normalize_layout(raw: &Value) -> CateringLayout {
    raw.get("layout")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

fn normalize_yes_no(raw: &Value, field: &str, default: YesNo) -> YesNo {
    match raw.get(field) {
        Some(Value::String(s)) if s == "YES" => YesNo::Yes,
        Some(Value::String(s)) if s == "NO" => YesNo::No,
        Some(Value::Bool(true)) => YesNo::Yes,
        Some(Value::Bool(false)) => YesNo::No,
        _ => default,
    }
}

/// Normalize a raw catering request record.
pub fn normalize_catering_request(raw: &Value) -> CateringRequest {
    CateringRequest {
        id: resolve_id(raw, &["id", "_id"]),
        contact_name: resolve_string(raw, &["contactName", "name"]).unwrap_or_default(),
        phone: resolve_string(raw, &["phone"]).unwrap_or_default(),
        email: resolve_string(raw, &["email"]).unwrap_or_default(),
        company: resolve_string(raw, &["company"]),
        event_date: resolve_string(raw, &["eventDate"]),
        event_time: resolve_string(raw, &["eventTime"]),
        guests: raw.get("guests").and_then(Value::as_i64),
        budget_per_person_kr: resolve_opt_i64(raw, &["budgetPerPersonKr", "budgetPerPerson"]),
        street: resolve_string(raw, &["street", "locationAddress"]),
        postal_code: resolve_string(raw, &["postalCode"]),
        city: resolve_string(raw, &["city"]),
        layout: normalize_layout(raw),
        requires_serving_staff: normalize_yes_no(raw, "requiresServingStaff", YesNo::No),
        needs_equipment: normalize_yes_no(raw, "needsEquipment", YesNo::No),
        allergies: resolve_string(raw, &["allergies", "dietary"]),
        notes: resolve_string(raw, &["notes", "message"]),
        status: normalize_catering_status(raw),
        created_at: resolve_string(raw, &["createdAt"]).unwrap_or_else(now_rfc3339),
    }
}
