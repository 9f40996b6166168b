//! # mqtt-socket-bridge
//!
//! `mqtt-socket-bridge` relays messages between an MQTT broker and browser
//! clients connected over WebSockets. Messages arriving on the command topic
//! are pushed to every connected client; events sent by clients are published
//! to the status topic.
//!
//! ## Core Modules
//!
//! - `broker`: The MQTT side: the `BrokerClient` seam and its rumqttc implementation.
//! - `client`: Connected WebSocket sessions and the registry that fans out to them.
//! - `config`: Handles loading and managing configuration.
//! - `relay`: The single-owner event loop tying the broker and the clients together.
//! - `transport`: The WebSocket server and the JSON messages exchanged with clients.
//! - `utils`: Shared utilities: error type and logging.

pub mod broker;
pub mod client;
pub mod config;
pub mod relay;
pub mod transport;
pub mod utils;
