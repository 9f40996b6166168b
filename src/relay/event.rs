use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::client::{Client, ClientId};
use crate::utils::{BridgeError, Result};

#[derive(Debug)]
pub enum RelayEvent {
    /// The broker acknowledged a new connection.
    BrokerConnected { session_present: bool },
    BrokerDisconnected { reason: String },
    BrokerMessage { topic: String, payload: Vec<u8> },
    ClientConnected(Client),
    ClientDisconnected(ClientId),
    /// A client asked for `payload` to be published on the status topic.
    ClientPublish { client_id: ClientId, payload: String },
    Poke,
}

/// Cloneable sending side of the relay queue.
///
/// Sends never block; they only fail once the relay has stopped.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: UnboundedSender<RelayEvent>,
}

impl RelayHandle {
    pub fn channel() -> (Self, UnboundedReceiver<RelayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: RelayEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| BridgeError::RelayClosed)
    }

    pub fn broker_connected(&self, session_present: bool) -> Result<()> {
        self.send(RelayEvent::BrokerConnected { session_present })
    }

    pub fn broker_disconnected(&self, reason: String) -> Result<()> {
        self.send(RelayEvent::BrokerDisconnected { reason })
    }

    pub fn broker_message(&self, topic: String, payload: Vec<u8>) -> Result<()> {
        self.send(RelayEvent::BrokerMessage { topic, payload })
    }

    pub fn client_connected(&self, client: Client) -> Result<()> {
        self.send(RelayEvent::ClientConnected(client))
    }

    pub fn client_disconnected(&self, client_id: ClientId) -> Result<()> {
        self.send(RelayEvent::ClientDisconnected(client_id))
    }

    pub fn client_publish(&self, client_id: ClientId, payload: String) -> Result<()> {
        self.send(RelayEvent::ClientPublish { client_id, payload })
    }

    pub fn poke(&self) -> Result<()> {
        self.send(RelayEvent::Poke)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
