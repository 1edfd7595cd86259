//! Common serde helpers for handling null values from the backend

use serde::{Deserialize, Deserializer};

/// Deserialize bool that treats null/missing as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

/// Deserialize bool that treats null/missing as false
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Flags {
        #[serde(default = "default_true", deserialize_with = "super::bool_true")]
        available: bool,
        #[serde(default, deserialize_with = "super::bool_false")]
        hidden: bool,
    }

    fn default_true() -> bool {
        true
    }

    #[test]
    fn null_defaults() {
        let f: Flags = serde_json::from_str(r#"{"available":null,"hidden":null}"#).unwrap();
        assert!(f.available);
        assert!(!f.hidden);

        let f: Flags = serde_json::from_str(r#"{}"#).unwrap();
        assert!(f.available);
        assert!(!f.hidden);

        let f: Flags = serde_json::from_str(r#"{"available":false,"hidden":true}"#).unwrap();
        assert!(!f.available);
        assert!(f.hidden);
    }
}
