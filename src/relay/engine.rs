//! Relay engine
//!
//! `RelayCore` owns the client registry and the broker handle and applies
//! relay events one at a time:
//! - client connect/disconnect drive a two-state machine keyed on the live
//!   client count: `Idle` (no clients, not subscribed) and `Active` (at least
//!   one client, subscribed to the command topic)
//! - broker messages on the command topic are broadcast as `server-event`s
//! - client publishes go to the status topic and are acknowledged to everyone
//!
//! Subscriptions change only on the 0 -> 1 and 1 -> 0 edges of the client
//! count. Broker failures are logged and never change the relay state: a
//! subscription change that could not be queued is retried before the next
//! event, and the broker adapter re-issues queued topics after a reconnect.

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::broker::BrokerClient;
use crate::broker::topic::topic_matches;
use crate::client::{Client, ClientId, ClientRegistry};
use crate::config::RelaySettings;
use crate::relay::RelayEvent;
use crate::transport::message::ServerMessage;
use crate::utils::BridgeError;

pub const WELCOME_NOTICE: &str = "Welcome client!";
pub const BROKER_CONNECTED_NOTICE: &str = "Connected to MQTT broker.";
pub const BROKER_DISCONNECTED_NOTICE: &str = "Disconnected from MQTT broker.";
pub const POKE_NOTICE: &str = "Server pokes you!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// No clients connected; the command topic is not subscribed.
    Idle,
    /// At least one client connected; the command topic is subscribed.
    Active,
}

pub struct RelayCore<B> {
    broker: B,
    registry: ClientRegistry,
    topics: RelaySettings,
    subscribed: bool,
    /// The last subscribe/unsubscribe for the current state failed.
    sync_pending: bool,
    broker_sessions: u64,
}

impl<B: BrokerClient> RelayCore<B> {
    pub fn new(broker: B, topics: RelaySettings) -> Self {
        Self {
            broker,
            registry: ClientRegistry::new(),
            topics,
            subscribed: false,
            sync_pending: false,
            broker_sessions: 0,
        }
    }

    pub fn state(&self) -> RelayState {
        if self.subscribed {
            RelayState::Active
        } else {
            RelayState::Idle
        }
    }

    pub fn client_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of broker connections acknowledged so far.
    pub fn broker_sessions(&self) -> u64 {
        self.broker_sessions
    }

    /// Processes events until every [`RelayHandle`](crate::relay::RelayHandle)
    /// has been dropped.
    pub async fn run(mut self, mut events: UnboundedReceiver<RelayEvent>) {
        info!(
            command_topic = %self.topics.command_topic,
            status_topic = %self.topics.status_topic,
            "relay started"
        );
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!("relay event queue closed");
    }

    pub fn handle(&mut self, event: RelayEvent) {
        if self.sync_pending {
            self.sync_subscription();
        }

        match event {
            RelayEvent::ClientConnected(client) => self.on_client_connected(client),
            RelayEvent::ClientDisconnected(client_id) => self.on_client_disconnected(&client_id),
            RelayEvent::ClientPublish { client_id, payload } => {
                self.on_client_publish(&client_id, payload)
            }
            RelayEvent::BrokerMessage { topic, payload } => self.on_broker_message(topic, payload),
            RelayEvent::BrokerConnected { session_present } => {
                self.on_broker_connected(session_present)
            }
            RelayEvent::BrokerDisconnected { reason } => {
                warn!(%reason, "lost MQTT broker connection");
                self.broadcast(&ServerMessage::notice(BROKER_DISCONNECTED_NOTICE));
            }
            RelayEvent::Poke => {
                info!("poking clients");
                self.broadcast(&ServerMessage::notice(POKE_NOTICE));
            }
        }
    }

    fn on_client_connected(&mut self, client: Client) {
        let client_id = client.id.clone();
        let count = self.registry.add(client);
        info!(client = %client_id, clients = count, "client connected");

        self.send_to(&client_id, &ServerMessage::notice(WELCOME_NOTICE));

        if count == 1 && !self.subscribed {
            self.subscribed = true;
            self.sync_subscription();
        }
    }

    fn on_client_disconnected(&mut self, client_id: &ClientId) {
        if !self.registry.contains(client_id) {
            debug!(client = %client_id, "disconnect for unknown client ignored");
            return;
        }

        let count = self.registry.remove(client_id);
        info!(client = %client_id, clients = count, "client disconnected");

        if count == 0 && self.subscribed {
            self.subscribed = false;
            self.sync_subscription();
        }
    }

    /// Brings the broker subscription in line with the relay state.
    fn sync_subscription(&mut self) {
        let result = if self.subscribed {
            self.broker.subscribe(&self.topics.command_topic)
        } else {
            self.broker.unsubscribe_all()
        };

        match result {
            Ok(()) => self.sync_pending = false,
            Err(e) => {
                warn!(error = %e, subscribed = self.subscribed, "subscription change failed, will retry");
                self.sync_pending = true;
            }
        }
    }

    fn on_client_publish(&mut self, client_id: &ClientId, payload: String) {
        debug!(client = %client_id, %payload, "client publish");
        match self
            .broker
            .publish(&self.topics.status_topic, payload.as_bytes())
        {
            Ok(()) => {
                self.broadcast(&ServerMessage::notice(format!("Published: {payload}")));
            }
            Err(e) => {
                warn!(error = %e, client = %client_id, "publish failed");
                self.send_to(client_id, &ServerMessage::error(format!("Publish failed: {e}")));
            }
        }
    }

    fn on_broker_message(&mut self, topic: String, payload: Vec<u8>) {
        if !topic_matches(&topic, &self.topics.command_topic) {
            debug!(%topic, "ignoring message outside the command topic");
            return;
        }

        let payload = match String::from_utf8(payload) {
            Ok(text) => text,
            Err(source) => {
                let err = BridgeError::MalformedPayload { topic, source };
                warn!(error = %err, "dropping broker message");
                return;
            }
        };

        let delivered = self.broadcast(&ServerMessage::ServerEvent {
            topic,
            payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        });
        debug!(delivered, "relayed broker message");
    }

    fn on_broker_connected(&mut self, session_present: bool) {
        self.broker_sessions += 1;
        info!(sessions = self.broker_sessions, session_present, "broker session up");

        // A clean session forgets subscriptions made on the previous one.
        if self.broker_sessions > 1 && !session_present && self.subscribed {
            if let Err(e) = self.broker.resubscribe_all() {
                warn!(error = %e, "re-subscribe failed");
            }
        }

        self.broadcast(&ServerMessage::notice(BROKER_CONNECTED_NOTICE));

        if let Some(greeting) = &self.topics.greeting {
            if let Err(e) = self
                .broker
                .publish(&self.topics.status_topic, greeting.as_bytes())
            {
                warn!(error = %e, "greeting publish failed");
            }
        }
    }

    fn broadcast(&self, msg: &ServerMessage) -> usize {
        match msg.to_ws() {
            Ok(ws_msg) => self.registry.broadcast(ws_msg),
            Err(e) => {
                warn!(error = %e, "failed to serialize server message");
                0
            }
        }
    }

    fn send_to(&self, client_id: &ClientId, msg: &ServerMessage) {
        let result = msg
            .to_ws()
            .map_err(BridgeError::from)
            .and_then(|ws_msg| self.registry.send_to(client_id, ws_msg));
        if let Err(e) = result {
            warn!(error = %e, "direct send failed");
        }
    }
}
