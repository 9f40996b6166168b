use std::collections::HashMap;

use tracing::{debug, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::client::{Client, ClientId};
use crate::utils::{BridgeError, Result};

/// The set of currently connected clients.
///
/// The registry is owned by the relay and never shared, so it needs no
/// locking of its own.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Registers a client and returns the number of connected clients after
    /// the addition. Re-adding an existing id replaces its channel.
    pub fn add(&mut self, client: Client) -> usize {
        self.clients.insert(client.id.clone(), client);
        self.clients.len()
    }

    /// Deregisters a client and returns the number of connected clients after
    /// the removal. Unknown ids leave the registry untouched.
    pub fn remove(&mut self, client_id: &ClientId) -> usize {
        if self.clients.remove(client_id).is_none() {
            debug!(client = %client_id, "remove for unknown client ignored");
        }
        self.clients.len()
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.clients.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Sends a message to a single client.
    pub fn send_to(&self, client_id: &ClientId, msg: WsMessage) -> Result<()> {
        let client = self
            .clients
            .get(client_id)
            .ok_or_else(|| BridgeError::ClientSendFailure {
                client_id: client_id.clone(),
            })?;

        client
            .sender
            .send(msg)
            .map_err(|_| BridgeError::ClientSendFailure {
                client_id: client_id.clone(),
            })
    }

    /// Delivers `msg` to every registered client and returns how many sends
    /// succeeded. A broken channel is logged and skipped; it never stops
    /// delivery to the remaining clients.
    pub fn broadcast(&self, msg: WsMessage) -> usize {
        let mut delivered = 0;
        for (client_id, client) in &self.clients {
            match client.sender.send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    let err = BridgeError::ClientSendFailure {
                        client_id: client_id.clone(),
                    };
                    warn!(error = %err, cause = %e, "broadcast skipped client");
                }
            }
        }
        delivered
    }
}
