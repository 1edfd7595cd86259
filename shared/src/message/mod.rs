//! Push-channel message types
//!
//! Shared between the message client and the app layer. The channel carries
//! four server pushes (new order, order field update, new catering request,
//! driver location) plus room membership control, framed as [`BusMessage`]s.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

use crate::models::catering::CateringRequest;
use crate::models::order::{Order, OrderPatch};
use crate::normalize;

/// Protocol version carried in the handshake
pub const PROTOCOL_VERSION: u16 = 1;

/// Channel event types (wire tag is a single byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Handshake message (client -> server on connect)
    Handshake = 0,
    /// Join a logical room
    JoinRoom = 1,
    /// Leave a logical room
    LeaveRoom = 2,
    /// New order notification (admin room)
    OrderNew = 3,
    /// Partial order update (order room + admin room)
    OrderUpdate = 4,
    /// New catering request notification (admin room)
    CateringNew = 5,
    /// Driver position sample (order room)
    DriverLocation = 6,
    /// Server acknowledgment of a request
    Response = 7,
}

impl TryFrom<u8> for EventType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventType::Handshake),
            1 => Ok(EventType::JoinRoom),
            2 => Ok(EventType::LeaveRoom),
            3 => Ok(EventType::OrderNew),
            4 => Ok(EventType::OrderUpdate),
            5 => Ok(EventType::CateringNew),
            6 => Ok(EventType::DriverLocation),
            7 => Ok(EventType::Response),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Handshake => write!(f, "handshake"),
            EventType::JoinRoom => write!(f, "join_room"),
            EventType::LeaveRoom => write!(f, "leave_room"),
            EventType::OrderNew => write!(f, "order_new"),
            EventType::OrderUpdate => write!(f, "order_update"),
            EventType::CateringNew => write!(f, "catering_new"),
            EventType::DriverLocation => write!(f, "driver_location"),
            EventType::Response => write!(f, "response"),
        }
    }
}

/// Logical subscription room
///
/// A customer tracking view joins its order's room; the admin console joins
/// the blanket admin room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    Order(String),
    Admin,
}

impl Room {
    pub fn as_wire(&self) -> String {
        match self {
            Room::Order(id) => format!("order:{}", id),
            Room::Admin => "admin".to_string(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if raw == "admin" {
            return Some(Room::Admin);
        }
        raw.strip_prefix("order:")
            .filter(|id| !id.is_empty())
            .map(|id| Room::Order(id.to_string()))
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_wire())
    }
}

/// Framed channel message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub correlation_id: Option<Uuid>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            correlation_id: None,
            payload,
        }
    }

    /// Set the correlation ID (used to ack a request)
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    fn json(event_type: EventType, payload: &impl Serialize) -> Self {
        // payload structs in this crate serialize infallibly
        let bytes = serde_json::to_vec(payload).expect("serialize channel payload");
        Self::new(event_type, bytes)
    }

    pub fn handshake(payload: &HandshakePayload) -> Self {
        Self::json(EventType::Handshake, payload)
    }

    pub fn join_room(room: &Room) -> Self {
        Self::json(EventType::JoinRoom, &RoomPayload { room: room.as_wire() })
    }

    pub fn leave_room(room: &Room) -> Self {
        Self::json(EventType::LeaveRoom, &RoomPayload { room: room.as_wire() })
    }

    pub fn response(payload: &ResponsePayload) -> Self {
        Self::json(EventType::Response, payload)
    }

    /// Parse the payload as a typed value
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Decoded server push
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    OrderNew(Order),
    OrderUpdate(OrderPatch),
    CateringNew(CateringRequest),
    DriverLocation(DriverLocationPayload),
}

impl ChannelEvent {
    /// Decode a broadcast frame into a typed event.
    ///
    /// Returns `None` for control frames (handshake/room/response) and for
    /// payloads that fail to parse as JSON; push payloads themselves go
    /// through the normalizer and therefore cannot fail.
    pub fn decode(msg: &BusMessage) -> Option<Self> {
        let raw: serde_json::Value = match msg.event_type {
            EventType::DriverLocation | EventType::OrderNew | EventType::OrderUpdate
            | EventType::CateringNew => msg.parse_payload().ok()?,
            _ => return None,
        };
        match msg.event_type {
            EventType::OrderNew => Some(Self::OrderNew(normalize::normalize_order(&raw))),
            EventType::OrderUpdate => {
                Some(Self::OrderUpdate(normalize::normalize_order_patch(&raw)))
            }
            EventType::CateringNew => Some(Self::CateringNew(
                normalize::normalize_catering_request(&raw),
            )),
            EventType::DriverLocation => serde_json::from_value(raw).ok().map(Self::DriverLocation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderStatus;
    use serde_json::json;

    #[test]
    fn event_type_byte_round_trip() {
        for byte in 0u8..=7 {
            let et = EventType::try_from(byte).unwrap();
            assert_eq!(et as u8, byte);
        }
        assert!(EventType::try_from(8).is_err());
    }

    #[test]
    fn room_wire_format() {
        assert_eq!(Room::Order("abc".into()).as_wire(), "order:abc");
        assert_eq!(Room::Admin.as_wire(), "admin");
        assert_eq!(Room::parse("order:abc"), Some(Room::Order("abc".into())));
        assert_eq!(Room::parse("admin"), Some(Room::Admin));
        assert_eq!(Room::parse("order:"), None);
        assert_eq!(Room::parse("kitchen"), None);
    }

    #[test]
    fn decode_order_update() {
        let payload = serde_json::to_vec(&json!({"_id": "o1", "status": "READY"})).unwrap();
        let msg = BusMessage::new(EventType::OrderUpdate, payload);
        match ChannelEvent::decode(&msg) {
            Some(ChannelEvent::OrderUpdate(patch)) => {
                assert_eq!(patch.id.as_deref(), Some("o1"));
                assert_eq!(patch.status, Some(OrderStatus::Ready));
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn control_frames_do_not_decode() {
        let msg = BusMessage::join_room(&Room::Admin);
        assert!(ChannelEvent::decode(&msg).is_none());
    }

    #[test]
    fn garbage_payload_decodes_to_none() {
        let msg = BusMessage::new(EventType::OrderNew, b"not json".to_vec());
        assert!(ChannelEvent::decode(&msg).is_none());
    }
}
