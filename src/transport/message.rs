use serde::{Deserialize, Serialize};
use tungstenite::protocol::Message as WsMessage;

/// Messages a browser client sends to the bridge.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Publish `payload` to the status topic.
    #[serde(rename = "client-event")]
    ClientEvent { payload: String },

    /// Ask the bridge to poke every connected client.
    #[serde(rename = "ping")]
    Ping,
}

/// Messages the bridge pushes to browser clients.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "notice")]
    Notice { message: String },

    /// A broker message relayed from the command topic.
    #[serde(rename = "server-event")]
    ServerEvent {
        topic: String,
        payload: String,
        timestamp: i64,
    },

    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerMessage {
    pub fn notice(message: impl Into<String>) -> Self {
        ServerMessage::Notice {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn to_ws(&self) -> Result<WsMessage, serde_json::Error> {
        serde_json::to_string(self).map(WsMessage::text)
    }
}
