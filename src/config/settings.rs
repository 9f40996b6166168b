use std::time::Duration;

use rumqttc::QoS;
use serde::Deserialize;

/// Top-level configuration settings for the bridge.
///
/// Includes settings for the WebSocket server, the MQTT broker connection,
/// the relayed topics and logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub relay: RelaySettings,
    pub log: LogSettings,
}

/// Configuration settings for the WebSocket server.
///
/// Defines the host and port the server will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Connection parameters for the MQTT broker.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    pub tls: bool,
    pub qos: u8,
    pub reconnect_delay_ms: u64,
    pub channel_capacity: usize,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl BrokerSettings {
    /// rumqttc rejects keep-alive intervals below five seconds.
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(5))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Levels above 2 are clamped to exactly-once.
    pub fn qos(&self) -> QoS {
        match self.qos {
            0 => QoS::AtMostOnce,
            1 => QoS::AtLeastOnce,
            _ => QoS::ExactlyOnce,
        }
    }
}

/// The two topics the relay bridges, plus the liveness greeting.
///
/// `command_topic` may be an MQTT filter (`+`/`#` wildcards). `greeting` is
/// `None` when configured as an empty string.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    pub command_topic: String,
    pub status_topic: String,
    pub greeting: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub relay: Option<PartialRelaySettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub client_id: Option<String>,
    pub keep_alive_secs: Option<u64>,
    pub tls: Option<bool>,
    pub qos: Option<u8>,
    pub reconnect_delay_ms: Option<u64>,
    pub channel_capacity: Option<usize>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialRelaySettings {
    pub command_topic: Option<String>,
    pub status_topic: Option<String>,
    pub greeting: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    /// Fills every missing value from `defaults`.
    pub fn merge(self, defaults: Settings) -> Settings {
        let server = self.server.unwrap_or(PartialServerSettings {
            host: None,
            port: None,
        });
        let broker = self.broker.unwrap_or(PartialBrokerSettings {
            host: None,
            port: None,
            client_id: None,
            keep_alive_secs: None,
            tls: None,
            qos: None,
            reconnect_delay_ms: None,
            channel_capacity: None,
            username: None,
            password: None,
        });
        let relay = self.relay.unwrap_or(PartialRelaySettings {
            command_topic: None,
            status_topic: None,
            greeting: None,
        });
        let log = self.log.unwrap_or(PartialLogSettings { level: None });

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(defaults.server.host),
                port: server.port.unwrap_or(defaults.server.port),
            },
            broker: BrokerSettings {
                host: broker.host.unwrap_or(defaults.broker.host),
                port: broker.port.unwrap_or(defaults.broker.port),
                client_id: broker.client_id.unwrap_or(defaults.broker.client_id),
                keep_alive_secs: broker
                    .keep_alive_secs
                    .unwrap_or(defaults.broker.keep_alive_secs),
                tls: broker.tls.unwrap_or(defaults.broker.tls),
                qos: broker.qos.unwrap_or(defaults.broker.qos),
                reconnect_delay_ms: broker
                    .reconnect_delay_ms
                    .unwrap_or(defaults.broker.reconnect_delay_ms),
                channel_capacity: broker
                    .channel_capacity
                    .unwrap_or(defaults.broker.channel_capacity),
                username: broker.username.or(defaults.broker.username),
                password: broker.password.or(defaults.broker.password),
            },
            relay: RelaySettings {
                command_topic: relay
                    .command_topic
                    .unwrap_or(defaults.relay.command_topic),
                status_topic: relay.status_topic.unwrap_or(defaults.relay.status_topic),
                // An empty greeting turns the liveness publish off.
                greeting: match relay.greeting {
                    Some(greeting) if greeting.is_empty() => None,
                    Some(greeting) => Some(greeting),
                    None => defaults.relay.greeting,
                },
            },
            log: LogSettings {
                level: log.level.unwrap_or(defaults.log.level),
            },
        }
    }
}

/// Provides default values for `Settings`.
///
/// A local Mosquitto on the default port and the `cmnd`/`stat` topic pair.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            broker: BrokerSettings {
                host: "localhost".to_string(),
                port: 1883,
                client_id: "mqtt-socket-bridge".to_string(),
                keep_alive_secs: 60,
                tls: false,
                qos: 0,
                reconnect_delay_ms: 1000,
                channel_capacity: 64,
                username: None,
                password: None,
            },
            relay: RelaySettings {
                command_topic: "cmnd/raja".to_string(),
                status_topic: "stat/raja".to_string(),
                greeting: Some("Hi, MQTT!".to_string()),
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
