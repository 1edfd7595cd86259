//! Pricing rules
//!
//! Pure functions over snapshotted menu data. Amounts stay in the backend's
//! raw integer representation until display time.
//!
//! The backend stores some prices in minor units (öre) and others in major
//! units (kronor). [`display_kronor`] papers over that with a fixed
//! threshold: values >= 1000 are divided by 100 and rounded, smaller values
//! pass through unchanged. Historical order totals depend on this exact
//! threshold and rounding, so it must not change.

use crate::models::menu::{MenuItem, OptionItem, OptionSelection};
use crate::models::order::Order;

/// Display threshold: at or above this, a stored value is treated as öre.
pub const MINOR_UNIT_THRESHOLD: i64 = 1000;

/// Convert a stored amount to display kronor.
pub fn display_kronor(amount: i64) -> i64 {
    if amount >= MINOR_UNIT_THRESHOLD {
        (amount as f64 / 100.0).round() as i64
    } else {
        amount
    }
}

/// Render a stored amount as a customer-facing price string.
pub fn format_kronor(amount: i64) -> String {
    format!("{} kr", display_kronor(amount))
}

/// Effective delta for one option: the full delta wins whenever it is
/// present and non-zero, else the half-portion delta, else nothing.
pub fn option_delta(option: &OptionItem) -> i64 {
    match option.price_delta {
        Some(delta) if delta != 0 => delta,
        _ => option.half_price_delta.unwrap_or(0),
    }
}

/// Unit price of one cart line: snapshotted base price plus the sum of
/// selected option deltas, each scaled by its selection quantity.
///
/// Selections that no longer resolve against the snapshotted item contribute
/// zero. Half-portion selections carry fractional quantities; the summed
/// delta is rounded once at the end.
pub fn unit_price(item: &MenuItem, selections: &[OptionSelection]) -> i64 {
    let delta: f64 = selections
        .iter()
        .map(|sel| {
            let resolved = item
                .find_group(&sel.group_id)
                .and_then(|g| g.find_option(&sel.option_id));
            let quantity = if sel.quantity == 0.0 { 1.0 } else { sel.quantity };
            match resolved {
                Some(option) => option_delta(option) as f64 * quantity,
                None => 0.0,
            }
        })
        .sum();
    item.price + delta.round() as i64
}

/// Display total for an order: backend total, then legacy subtotal, then the
/// sum of its lines, converted through the display heuristic.
pub fn order_display_total(order: &Order) -> i64 {
    display_kronor(order.raw_total())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu::OptionGroup;
    use crate::models::order::{OrderItem, OrderStatus};
    use crate::normalize::normalize_order;
    use serde_json::json;

    fn item_with_option(base: i64, delta: Option<i64>, half: Option<i64>) -> MenuItem {
        MenuItem {
            id: "item-1".into(),
            name: "Adana".into(),
            price: base,
            category: "Grill".into(),
            description: None,
            image_url: None,
            is_available: true,
            option_groups: vec![OptionGroup {
                id: "g1".into(),
                name: "Tillbehör".into(),
                min: None,
                max: None,
                allow_half: false,
                options: vec![OptionItem {
                    id: "o1".into(),
                    name: "Ris".into(),
                    price_delta: delta,
                    half_price_delta: half,
                    is_available: true,
                }],
            }],
        }
    }

    fn selection(qty: f64) -> OptionSelection {
        OptionSelection {
            group_id: "g1".into(),
            option_id: "o1".into(),
            quantity: qty,
        }
    }

    #[test]
    fn display_conversion_threshold() {
        assert_eq!(display_kronor(12000), 120);
        assert_eq!(display_kronor(120), 120);
        assert_eq!(display_kronor(999), 999);
        // boundary is inclusive of the divide path
        assert_eq!(display_kronor(1000), 10);
        assert_eq!(display_kronor(1050), 11); // round, not floor
        assert_eq!(display_kronor(0), 0);
    }

    #[test]
    fn format_kronor_renders_display_value() {
        assert_eq!(format_kronor(24500), "245 kr");
        assert_eq!(format_kronor(95), "95 kr");
    }

    #[test]
    fn full_delta_preferred_over_half() {
        let item = item_with_option(5000, Some(1500), Some(800));
        assert_eq!(unit_price(&item, &[selection(1.0)]), 6500);
    }

    #[test]
    fn zero_full_delta_falls_back_to_half() {
        let item = item_with_option(5000, Some(0), Some(800));
        assert_eq!(unit_price(&item, &[selection(1.0)]), 5800);
        let item = item_with_option(5000, None, Some(800));
        assert_eq!(unit_price(&item, &[selection(1.0)]), 5800);
    }

    #[test]
    fn delta_scales_with_selection_quantity() {
        let item = item_with_option(5000, Some(1500), None);
        assert_eq!(unit_price(&item, &[selection(2.0)]), 8000);
        // half portion
        assert_eq!(unit_price(&item, &[selection(0.5)]), 5750);
        // zero quantity behaves as one
        assert_eq!(unit_price(&item, &[selection(0.0)]), 6500);
    }

    #[test]
    fn unresolvable_selection_contributes_zero() {
        let item = item_with_option(5000, Some(1500), None);
        let stale = OptionSelection {
            group_id: "gone".into(),
            option_id: "o1".into(),
            quantity: 1.0,
        };
        assert_eq!(unit_price(&item, &[stale]), 5000);
    }

    #[test]
    fn no_selections_is_base_price() {
        let item = item_with_option(9000, Some(1500), None);
        assert_eq!(unit_price(&item, &[]), 9000);
    }

    #[test]
    fn order_total_preference_chain() {
        let order = normalize_order(&json!({
            "id": "o1", "status": "READY", "total": 24500, "subtotal": 11111
        }));
        assert_eq!(order_display_total(&order), 245);

        let order = Order {
            total: None,
            subtotal: Some(12000),
            ..order
        };
        assert_eq!(order_display_total(&order), 120);

        let order = Order {
            total: None,
            subtotal: None,
            items: vec![OrderItem {
                item_id: "m1".into(),
                name: "Adana".into(),
                price: 9000,
                qty: 2,
            }],
            status: OrderStatus::Ready,
            ..order
        };
        assert_eq!(order_display_total(&order), 180);
    }
}
