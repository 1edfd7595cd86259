use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

// ==================== Payloads ====================

/// Handshake payload (client -> server)
///
/// Carries the client's protocol version for server-side version checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// Protocol version
    pub version: u16,
    /// Client name/identifier
    pub client_name: Option<String>,
    /// Client version
    pub client_version: Option<String>,
    /// Bearer token for admin-room authorization (optional)
    pub token: Option<String>,
}

/// Room membership payload (client -> server)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPayload {
    /// Wire form of the room ("order:{id}" or "admin")
    pub room: String,
}

/// Driver position sample (server -> order room)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocationPayload {
    #[serde(default)]
    pub order_id: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl DriverLocationPayload {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Generic acknowledgment (server -> client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub success: bool,
    pub message: String,
}

impl ResponsePayload {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
