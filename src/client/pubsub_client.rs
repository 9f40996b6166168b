use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

pub type ClientId = String;

/// Represents a connected WebSocket client of the bridge.
///
/// Each client is uniquely identified by an `id` and has a channel (`sender`)
/// whose receiving half is drained by the socket writer task.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for the client, `client-<uuid>`.
    pub id: ClientId,

    /// Channel to send WebSocket messages to the client.
    pub sender: UnboundedSender<WsMessage>,
}

impl Client {
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("client-{}", Uuid::new_v4()),
            sender,
        }
    }

    /// A client is open until its writer task drops the receiving half.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}
