//! Checkout payload builder
//!
//! Turns the session cart plus the customer form into the versioned order
//! creation payload. Selected options ride along twice: structured per item,
//! and appended to the free-text note so they show up in the admin board and
//! history. The tray number travels inside the note as well, by convention.

use shared::models::menu::OptionSelection;
use shared::models::order::{
    OrderCreate, OrderCreateItem, OrderType, PaymentMethod, ServiceKind, WireOptionSelection,
};
use thiserror::Error;

use crate::cart::{CartLine, CartStore};
use crate::store_gate::{GateClosed, StoreStatusGate};
use crate::validate;

/// Checkout form state
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub method: ServiceKind,
    pub payment_method: PaymentMethod,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub notes: String,
    /// Dine-in tray number, already clamped by the input handler
    pub table: Option<String>,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            method: ServiceKind::Takeaway,
            payment_method: PaymentMethod::Cash,
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            postal_code: String::new(),
            notes: String::new(),
            table: None,
        }
    }
}

/// Pre-flight checkout failures; none of these produce a request
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("{0}")]
    Closed(#[from] GateClosed),

    #[error("Varukorgen är tom")]
    EmptyCart,

    #[error("Leverans är endast tillgänglig för specifika postnummer.")]
    PostcodeNotDeliverable,

    #[error("Ange namn")]
    MissingName,

    #[error("Ange ett giltigt telefonnummer.")]
    InvalidPhone,
}

/// Build the order creation payload, running every client-side check first.
pub fn build_order(
    cart: &CartStore,
    form: &CheckoutForm,
    gate: &StoreStatusGate,
    delivery_postcodes: &[String],
) -> Result<OrderCreate, CheckoutError> {
    gate.ensure_open()?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if form.method == ServiceKind::Delivery
        && !delivery_postcodes.iter().any(|p| p == form.postal_code.trim())
    {
        return Err(CheckoutError::PostcodeNotDeliverable);
    }
    if form.name.trim().is_empty() {
        return Err(CheckoutError::MissingName);
    }
    if !validate::valid_phone(&form.phone) {
        return Err(CheckoutError::InvalidPhone);
    }

    let items = cart
        .lines()
        .iter()
        .map(|line| OrderCreateItem {
            menu_item_id: line.item.id.clone(),
            quantity: line.qty,
            selected_options: line
                .selected_options
                .iter()
                .filter(|sel| !sel.group_id.is_empty() && !sel.option_id.is_empty())
                .map(WireOptionSelection::from)
                .collect(),
        })
        .collect();

    let table = if form.method == ServiceKind::DineIn {
        form.table.clone().filter(|t| !t.is_empty())
    } else {
        None
    };
    let note = compose_note(cart, &form.notes, table.as_deref());

    Ok(OrderCreate {
        order_type: match form.method {
            ServiceKind::DineIn => OrderType::DineIn,
            _ => OrderType::Takeaway,
        },
        payment_method: form.payment_method,
        items,
        customer_name: form.name.trim().to_string(),
        phone: form.phone.trim().to_string(),
        email: non_empty(&form.email),
        note,
        table,
    })
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn fmt_qty(qty: f64) -> String {
    if qty.fract() == 0.0 {
        format!("{}", qty as i64)
    } else {
        format!("{}", qty)
    }
}

/// Render one line's selections as "Ris, Extra sås x2"; unresolvable
/// selections are skipped.
fn stringify_selections(line: &CartLine) -> String {
    let parts: Vec<String> = line
        .selected_options
        .iter()
        .filter_map(|sel: &OptionSelection| {
            let option = line
                .item
                .find_group(&sel.group_id)
                .and_then(|g| g.find_option(&sel.option_id))?;
            if sel.quantity != 0.0 && sel.quantity != 1.0 {
                Some(format!("{} x{}", option.name, fmt_qty(sel.quantity)))
            } else {
                Some(option.name.clone())
            }
        })
        .collect();
    parts.join(", ")
}

fn auto_options_note(cart: &CartStore) -> String {
    cart.lines()
        .iter()
        .filter(|l| !l.selected_options.is_empty())
        .filter_map(|l| {
            let opts = stringify_selections(l);
            (!opts.is_empty()).then(|| format!("- {}× {}: {}", l.qty, l.item.name, opts))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compose the final note: tray line first, then user notes, then the
/// auto-generated options block.
fn compose_note(cart: &CartStore, notes: &str, table: Option<&str>) -> Option<String> {
    let auto = auto_options_note(cart);
    let user = notes.trim();
    let base = if auto.is_empty() {
        user.to_string()
    } else if !user.is_empty() {
        format!("{}\n\nValda tillbehör:\n{}", user, auto)
    } else {
        format!("Valda tillbehör:\n{}", auto)
    };
    let tray = table.map(|t| format!("Bricknummer: {}", t));

    let combined = [tray.as_deref(), non_empty(&base).as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n\n");
    (!combined.is_empty()).then_some(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::menu::{MenuItem, OptionGroup, OptionItem};

    fn item(id: &str, name: &str, price: i64) -> MenuItem {
        MenuItem {
            id: id.into(),
            name: name.into(),
            price,
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
                    price_delta: Some(1500),
                    half_price_delta: None,
                    is_available: true,
                }],
            }],
        }
    }

    fn select(qty: f64) -> OptionSelection {
        OptionSelection {
            group_id: "g1".into(),
            option_id: "o1".into(),
            quantity: qty,
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Aram".into(),
            phone: "070-123 45 67".into(),
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn builds_versioned_payload() {
        let mut cart = CartStore::new();
        cart.add(item("a", "Adana", 9000), vec![]);
        cart.inc("a");
        cart.add(item("b", "Halloumi", 5000), vec![select(1.0)]);

        let payload = build_order(&cart, &form(), &StoreStatusGate::new(), &[]).unwrap();
        assert_eq!(payload.order_type, OrderType::Takeaway);
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.items[0].quantity, 2);
        assert!(payload.items[0].selected_options.is_empty());
        assert_eq!(payload.items[1].selected_options[0].option_id, "o1");
        assert_eq!(payload.items[1].selected_options[0].quantity, 1);
        assert_eq!(
            payload.note.as_deref(),
            Some("Valda tillbehör:\n- 1× Halloumi: Ris")
        );
    }

    #[test]
    fn note_combines_tray_user_and_options() {
        let mut cart = CartStore::new();
        cart.add(item("b", "Halloumi", 5000), vec![select(2.0)]);
        let f = CheckoutForm {
            method: ServiceKind::DineIn,
            notes: "Utan lök".into(),
            table: Some("7".into()),
            ..form()
        };
        let payload = build_order(&cart, &f, &StoreStatusGate::new(), &[]).unwrap();
        assert_eq!(payload.order_type, OrderType::DineIn);
        assert_eq!(payload.table.as_deref(), Some("7"));
        assert_eq!(
            payload.note.as_deref(),
            Some("Bricknummer: 7\n\nUtan lök\n\nValda tillbehör:\n- 1× Halloumi: Ris x2")
        );
    }

    #[test]
    fn half_quantity_renders_fractionally() {
        let mut cart = CartStore::new();
        cart.add(item("b", "Meze", 5000), vec![select(0.5)]);
        let payload = build_order(&cart, &form(), &StoreStatusGate::new(), &[]).unwrap();
        assert_eq!(
            payload.note.as_deref(),
            Some("Valda tillbehör:\n- 1× Meze: Ris x0.5")
        );
        // wire quantity still clamps up to 1
        assert_eq!(payload.items[0].selected_options[0].quantity, 1);
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = build_order(&CartStore::new(), &form(), &StoreStatusGate::new(), &[]).unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
    }

    #[test]
    fn delivery_requires_allowed_postcode() {
        let mut cart = CartStore::new();
        cart.add(item("a", "Adana", 9000), vec![]);
        let f = CheckoutForm {
            method: ServiceKind::Delivery,
            postal_code: "11111".into(),
            ..form()
        };
        let allowed = vec!["17152".to_string()];
        assert_eq!(
            build_order(&cart, &f, &StoreStatusGate::new(), &allowed).unwrap_err(),
            CheckoutError::PostcodeNotDeliverable
        );

        let f = CheckoutForm {
            postal_code: "17152".into(),
            ..f
        };
        // delivery maps onto the takeaway order type on the wire
        let payload = build_order(&cart, &f, &StoreStatusGate::new(), &allowed).unwrap();
        assert_eq!(payload.order_type, OrderType::Takeaway);
    }

    #[test]
    fn invalid_phone_is_rejected_before_any_request() {
        let mut cart = CartStore::new();
        cart.add(item("a", "Adana", 9000), vec![]);
        let f = CheckoutForm {
            phone: "123".into(),
            ..form()
        };
        assert_eq!(
            build_order(&cart, &f, &StoreStatusGate::new(), &[]).unwrap_err(),
            CheckoutError::InvalidPhone
        );
    }

    #[test]
    fn tray_number_only_rides_on_dine_in() {
        let mut cart = CartStore::new();
        cart.add(item("a", "Adana", 9000), vec![]);
        let f = CheckoutForm {
            method: ServiceKind::Takeaway,
            table: Some("7".into()),
            ..form()
        };
        let payload = build_order(&cart, &f, &StoreStatusGate::new(), &[]).unwrap();
        assert!(payload.table.is_none());
        assert!(payload.note.is_none());
    }
}
