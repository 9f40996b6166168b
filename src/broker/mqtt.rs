//! rumqttc-backed broker connection.
//!
//! [`connect`](MqttBrokerClient::connect) builds the client/event-loop pair.
//! The client half is owned by the relay and only ever enqueues requests
//! (`try_*`), so the relay never blocks on the network. The event-loop half
//! runs on its own task, drives the connection (rumqttc reconnects on the next
//! poll after an error) and forwards the handshake and every inbound publish
//! to the relay queue.

use std::collections::BTreeSet;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, Transport};
use tracing::{debug, info, warn};

use crate::broker::BrokerClient;
use crate::config::BrokerSettings;
use crate::relay::RelayHandle;
use crate::utils::{BridgeError, Result};

pub struct MqttBrokerClient {
    client: AsyncClient,
    qos: QoS,
    /// Topics whose SUBSCRIBE was queued; kept across reconnects.
    active: BTreeSet<String>,
}

pub struct BrokerEventLoop {
    eventloop: EventLoop,
    reconnect_delay: Duration,
}

impl MqttBrokerClient {
    /// Prepares the broker session. Nothing touches the network until the
    /// returned [`BrokerEventLoop`] is run.
    pub fn connect(settings: &BrokerSettings) -> (Self, BrokerEventLoop) {
        let mut opts = MqttOptions::new(&settings.client_id, &settings.host, settings.port);
        opts.set_keep_alive(settings.keep_alive());

        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            opts.set_credentials(user, pass);
        }
        if settings.tls {
            opts.set_transport(Transport::tls_with_default_config());
        }

        let (client, eventloop) = AsyncClient::new(opts, settings.channel_capacity);

        info!(
            host = %settings.host,
            port = settings.port,
            tls = settings.tls,
            "prepared MQTT session"
        );

        (
            Self {
                client,
                qos: settings.qos(),
                active: BTreeSet::new(),
            },
            BrokerEventLoop {
                eventloop,
                reconnect_delay: settings.reconnect_delay(),
            },
        )
    }

    pub fn active_topics(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }
}

impl BrokerClient for MqttBrokerClient {
    fn subscribe(&mut self, topic: &str) -> Result<()> {
        if self.active.contains(topic) {
            debug!(topic, "already subscribed");
            return Ok(());
        }
        info!(topic, "subscribing");
        self.client.try_subscribe(topic, self.qos)?;
        self.active.insert(topic.to_string());
        Ok(())
    }

    /// Topics whose UNSUBSCRIBE could not be queued stay active so a later
    /// call retries them.
    fn unsubscribe_all(&mut self) -> Result<()> {
        let mut first_err = None;
        let client = &self.client;
        self.active.retain(|topic| {
            info!(topic = %topic, "unsubscribing");
            match client.try_unsubscribe(topic.as_str()) {
                Ok(()) => false,
                Err(e) => {
                    first_err.get_or_insert(BridgeError::from(e));
                    true
                }
            }
        });
        first_err.map_or(Ok(()), Err)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        debug!(topic, bytes = payload.len(), "publishing");
        self.client
            .try_publish(topic, self.qos, false, payload.to_vec())?;
        Ok(())
    }

    fn resubscribe_all(&mut self) -> Result<()> {
        let mut first_err = None;
        for topic in &self.active {
            info!(topic = %topic, "re-subscribing after reconnect");
            if let Err(e) = self.client.try_subscribe(topic.as_str(), self.qos) {
                first_err.get_or_insert(BridgeError::from(e));
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl BrokerEventLoop {
    /// Drives the broker connection until the relay queue closes.
    ///
    /// The ConnAck is read straight off the polled packet stream, so the relay
    /// hears about every successful connection exactly once.
    pub async fn run(mut self, relay: RelayHandle) {
        let mut connected = false;

        loop {
            if relay.is_closed() {
                info!("relay closed, stopping MQTT event loop");
                break;
            }

            let forwarded = match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    connected = true;
                    info!(session_present = ack.session_present, "connected to MQTT broker");
                    relay.broker_connected(ack.session_present)
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    debug!(topic = %publish.topic, bytes = publish.payload.len(), "MQTT message received");
                    relay.broker_message(publish.topic, publish.payload.to_vec())
                }
                Ok(_) => Ok(()),
                Err(e) => {
                    let forwarded = if connected {
                        connected = false;
                        relay.broker_disconnected(e.to_string())
                    } else {
                        Ok(())
                    };
                    warn!(
                        error = %e,
                        retry_in_ms = self.reconnect_delay.as_millis() as u64,
                        "MQTT connection error"
                    );
                    tokio::time::sleep(self.reconnect_delay).await;
                    forwarded
                }
            };

            if forwarded.is_err() {
                info!("relay closed, stopping MQTT event loop");
                break;
            }
        }
    }
}
