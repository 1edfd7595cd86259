//! Menu Model

use serde::{Deserialize, Serialize};

use super::serde_helpers;

/// Fallback category label for items the backend left uncategorized
pub const FALLBACK_CATEGORY: &str = "Övrigt";

/// Menu item entity
///
/// Snapshotted by cart lines at add time; prices stay in the backend's raw
/// integer representation (see [`crate::pricing::display_kronor`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_available: bool,
    #[serde(default)]
    pub option_groups: Vec<OptionGroup>,
}

fn default_true() -> bool {
    true
}

/// Option group attached to a menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionGroup {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub allow_half: bool,
    #[serde(default)]
    pub options: Vec<OptionItem>,
}

/// Single selectable option within a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Additive price delta, same raw currency unit as the item price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_delta: Option<i64>,
    /// Delta applied when a half portion is selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_price_delta: Option<i64>,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_available: bool,
}

/// A customer's selection of one option within a group
///
/// Quantity is fractional because half-portion groups step selections by 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSelection {
    pub group_id: String,
    pub option_id: String,
    pub quantity: f64,
}

impl OptionGroup {
    /// Identity used for selection matching: id when present, else name.
    pub fn key(&self) -> &str {
        if self.id.is_empty() { &self.name } else { &self.id }
    }

    /// Locate an option by its selection identity.
    pub fn find_option(&self, option_id: &str) -> Option<&OptionItem> {
        self.options.iter().find(|o| o.key() == option_id)
    }
}

impl OptionItem {
    /// Identity used for selection matching: id when present, else name.
    pub fn key(&self) -> &str {
        if self.id.is_empty() { &self.name } else { &self.id }
    }
}

impl MenuItem {
    /// Locate an option group by its selection identity.
    pub fn find_group(&self, group_id: &str) -> Option<&OptionGroup> {
        self.option_groups.iter().find(|g| g.key() == group_id)
    }
}

/// Menu item creation payload (JSON variant; multipart creation goes through
/// the client's form builder)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    pub name: String,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Partial menu item update payload (admin edits, inventory toggles)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_groups: Option<Vec<OptionGroup>>,
}

impl MenuItemUpdate {
    /// Inventory toggle payload
    pub fn availability(is_available: bool) -> Self {
        Self {
            is_available: Some(is_available),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_and_option_keys_fall_back_to_name() {
        let group = OptionGroup {
            id: String::new(),
            name: "Tillbehör".into(),
            min: None,
            max: None,
            allow_half: false,
            options: vec![OptionItem {
                id: "opt-1".into(),
                name: "Ris".into(),
                price_delta: Some(1500),
                half_price_delta: None,
                is_available: true,
            }],
        };
        assert_eq!(group.key(), "Tillbehör");
        assert_eq!(group.options[0].key(), "opt-1");
        assert!(group.find_option("opt-1").is_some());
        assert!(group.find_option("Ris").is_none());
    }

    #[test]
    fn availability_defaults_true_on_null() {
        let item: MenuItem = serde_json::from_str(
            r#"{"id":"1","name":"Halloumi","price":9500,"category":"Grill","isAvailable":null}"#,
        )
        .unwrap();
        assert!(item.is_available);
        assert!(item.option_groups.is_empty());
    }
}
