//! Store-status gate
//!
//! Caches the online-ordering open/closed flag and gates checkout and
//! option-launch actions client-side. This is a UX courtesy: the backend
//! independently rejects orders while closed.

use mangal_client::{Api, HttpClient};
use shared::models::store_status::StoreStatus;
use thiserror::Error;

/// Fallback shown when the operator closed ordering without a message
pub const DEFAULT_CLOSED_MESSAGE: &str = "Restaurangen är stängd för onlinebeställningar just nu. \
     Vi tar gärna emot din beställning under våra öppettider. Varmt välkommen tillbaka!";

/// Raised by gated actions while ordering is closed
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct GateClosed {
    pub message: String,
}

/// Cached store status with on-demand refresh
#[derive(Debug, Clone, Default)]
pub struct StoreStatusGate {
    status: Option<StoreStatus>,
}

impl StoreStatusGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from the backend; a failed fetch keeps the previous value.
    pub async fn refresh<C: HttpClient>(&mut self, api: &Api<C>) {
        match api.get_store_status().await {
            Ok(status) => self.status = Some(status),
            Err(e) => {
                tracing::warn!("store status refresh failed, keeping previous: {}", e);
            }
        }
    }

    pub fn status(&self) -> Option<&StoreStatus> {
        self.status.as_ref()
    }

    /// Closed only when the backend explicitly said so; unknown counts as open.
    pub fn is_closed(&self) -> bool {
        matches!(&self.status, Some(s) if !s.online_orders_open)
    }

    /// Gate an ordering action: `Err` carries the operator message (or the
    /// default fallback) while ordering is closed.
    pub fn ensure_open(&self) -> Result<(), GateClosed> {
        if !self.is_closed() {
            return Ok(());
        }
        let message = self
            .status
            .as_ref()
            .and_then(|s| s.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_CLOSED_MESSAGE.to_string());
        Err(GateClosed { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeHttp, FailKind};
    use mangal_client::Api;
    use serde_json::json;

    #[tokio::test]
    async fn unknown_status_counts_as_open() {
        let gate = StoreStatusGate::new();
        assert!(!gate.is_closed());
        assert!(gate.ensure_open().is_ok());
    }

    #[tokio::test]
    async fn closed_with_message_surfaces_it() {
        let http = FakeHttp::new();
        http.respond(
            "store-status",
            json!({"onlineOrdersOpen": false, "message": "Semesterstängt v.29"}),
        );
        let api = Api::new(http);
        let mut gate = StoreStatusGate::new();
        gate.refresh(&api).await;

        assert!(gate.is_closed());
        let err = gate.ensure_open().unwrap_err();
        assert_eq!(err.message, "Semesterstängt v.29");
    }

    #[tokio::test]
    async fn closed_without_message_uses_fallback() {
        let http = FakeHttp::new();
        http.respond("store-status", json!({"onlineOrdersOpen": false}));
        let api = Api::new(http);
        let mut gate = StoreStatusGate::new();
        gate.refresh(&api).await;

        let err = gate.ensure_open().unwrap_err();
        assert_eq!(err.message, DEFAULT_CLOSED_MESSAGE);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_value() {
        let http = FakeHttp::new();
        http.respond("store-status", json!({"onlineOrdersOpen": false}));
        let api = Api::new(http);
        let mut gate = StoreStatusGate::new();
        gate.refresh(&api).await;
        assert!(gate.is_closed());

        api.http().fail("store-status", FailKind::Internal);
        gate.refresh(&api).await;
        assert!(gate.is_closed());
    }
}
