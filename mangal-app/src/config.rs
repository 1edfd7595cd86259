//! Application configuration
//!
//! Every knob can come from the environment (a `.env` file is honored):
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | API_BASE | (empty -> `/api`) | Backend base URL |
//! | MESSAGE_ADDR | - | Push-channel TCP address |
//! | DELIVERY_POSTCODES | 17152,17121,17122,17123 | Deliverable postcodes |
//! | DRIVER_TOKEN | - | Driver endpoint bearer token |
//! | LOG_LEVEL | info | Tracing level |
//! | LOG_DIR | - | Optional log file directory |

use mangal_client::ClientConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Raw backend base URL (prefix normalization happens in the client)
    pub api_base: String,
    /// Push-channel TCP address
    pub message_addr: Option<String>,
    /// Postal codes eligible for delivery
    pub delivery_postcodes: Vec<String>,
    /// Driver endpoint token
    pub driver_token: Option<String>,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// Optional log file directory
    pub log_dir: Option<String>,
}

const DEFAULT_DELIVERY_POSTCODES: &str = "17152,17121,17122,17123";

fn parse_postcodes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables, after pulling in a
    /// `.env` file when one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            api_base: std::env::var("API_BASE").unwrap_or_default(),
            message_addr: std::env::var("MESSAGE_ADDR").ok().filter(|s| !s.is_empty()),
            delivery_postcodes: parse_postcodes(
                &std::env::var("DELIVERY_POSTCODES")
                    .unwrap_or_else(|_| DEFAULT_DELIVERY_POSTCODES.into()),
            ),
            driver_token: std::env::var("DRIVER_TOKEN").ok().filter(|s| !s.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Client configuration derived from this app configuration
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.api_base);
        if let Some(addr) = &self.message_addr {
            config = config.with_message_addr(addr);
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            message_addr: None,
            delivery_postcodes: parse_postcodes(DEFAULT_DELIVERY_POSTCODES),
            driver_token: None,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postcode_parsing_trims_and_skips_empties() {
        assert_eq!(
            parse_postcodes("17152, 17121 ,,17122"),
            vec!["17152", "17121", "17122"]
        );
        assert!(parse_postcodes("").is_empty());
    }

    #[test]
    fn default_config_has_the_standard_postcodes() {
        let config = AppConfig::default();
        assert_eq!(config.delivery_postcodes.len(), 4);
        assert_eq!(config.client_config().api_base, "/api");
    }
}
