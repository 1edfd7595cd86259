use tokio::sync::broadcast;

use crate::message::MessageError;
use crate::message::transport::{MemoryTransport, TcpTransport, Transport};
use shared::message::{BusMessage, ChannelEvent, EventType, HandshakePayload, PROTOCOL_VERSION, Room};

/// Push-channel client
///
/// Connects, performs the handshake, then fans incoming frames out to
/// subscribers. Room membership follows the customer/admin views: a tracking
/// view joins its order's room on mount and leaves it on unmount; the admin
/// console joins the blanket admin room.
#[derive(Debug, Clone)]
pub struct MessageClient {
    transport: ClientTransport,
    event_tx: broadcast::Sender<BusMessage>,
}

#[derive(Debug, Clone)]
enum ClientTransport {
    Tcp(TcpTransport),
    Memory(MemoryTransport),
}

impl ClientTransport {
    async fn read_message(&self) -> Result<BusMessage, MessageError> {
        match self {
            ClientTransport::Tcp(t) => t.read_message().await,
            ClientTransport::Memory(t) => t.read_message().await,
        }
    }

    async fn write_message(&self, msg: &BusMessage) -> Result<(), MessageError> {
        match self {
            ClientTransport::Tcp(t) => t.write_message(msg).await,
            ClientTransport::Memory(t) => t.write_message(msg).await,
        }
    }

    async fn close(&self) -> Result<(), MessageError> {
        match self {
            ClientTransport::Tcp(t) => t.close().await,
            ClientTransport::Memory(t) => t.close().await,
        }
    }
}

impl MessageClient {
    fn new(transport: ClientTransport) -> Self {
        let (event_tx, _) = broadcast::channel(1024);

        let client = Self {
            transport: transport.clone(),
            event_tx: event_tx.clone(),
        };

        // Background task: read frames and fan them out to subscribers
        tokio::spawn(async move {
            loop {
                match transport.read_message().await {
                    Ok(msg) => {
                        if msg.event_type == EventType::Response {
                            tracing::debug!(request_id = %msg.request_id, "channel ack");
                        }
                        if let Err(e) = event_tx.send(msg) {
                            tracing::debug!("No subscribers for event: {}", e);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Transport read error: {}", e);
                        // connection is gone; the owner must reconnect
                        break;
                    }
                }
            }
        });

        client
    }

    async fn handshake(
        transport: &ClientTransport,
        client_name: &str,
        token: Option<&str>,
    ) -> Result<(), MessageError> {
        let payload = HandshakePayload {
            version: PROTOCOL_VERSION,
            client_name: Some(client_name.to_string()),
            client_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            token: token.map(str::to_string),
        };
        transport.write_message(&BusMessage::handshake(&payload)).await
    }

    /// Connect via TCP
    pub async fn connect(addr: &str, client_name: &str) -> Result<Self, MessageError> {
        Self::connect_with_token(addr, client_name, None).await
    }

    /// Connect via TCP with an admin token (required for the admin room)
    pub async fn connect_with_token(
        addr: &str,
        client_name: &str,
        token: Option<&str>,
    ) -> Result<Self, MessageError> {
        let transport = ClientTransport::Tcp(TcpTransport::connect(addr).await?);
        Self::handshake(&transport, client_name, token).await?;
        Ok(Self::new(transport))
    }

    /// Create an in-memory client (tests)
    pub fn memory(
        server_broadcast_tx: &broadcast::Sender<BusMessage>,
        client_to_server_tx: &broadcast::Sender<BusMessage>,
    ) -> Self {
        let transport =
            ClientTransport::Memory(MemoryTransport::new(server_broadcast_tx, client_to_server_tx));
        Self::new(transport)
    }

    /// Join a logical room
    pub async fn join(&self, room: &Room) -> Result<(), MessageError> {
        self.send(&BusMessage::join_room(room)).await
    }

    /// Leave a logical room (explicit teardown on view unmount)
    pub async fn leave(&self, room: &Room) -> Result<(), MessageError> {
        self.send(&BusMessage::leave_room(room)).await
    }

    /// Subscribe to raw broadcast frames
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.event_tx.subscribe()
    }

    /// Receive the next decoded push event, skipping control frames
    pub async fn recv_event(
        rx: &mut broadcast::Receiver<BusMessage>,
    ) -> Result<ChannelEvent, MessageError> {
        loop {
            let msg = rx
                .recv()
                .await
                .map_err(|e| MessageError::Connection(format!("Event bus error: {}", e)))?;
            if let Some(event) = ChannelEvent::decode(&msg) {
                return Ok(event);
            }
        }
    }

    /// Send a frame (fire and forget)
    pub async fn send(&self, msg: &BusMessage) -> Result<(), MessageError> {
        self.transport.write_message(msg).await
    }

    /// Close the client connection
    pub async fn close(&self) -> Result<(), MessageError> {
        self.transport.close().await
    }
}
