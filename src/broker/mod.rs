//! The `broker` module is the bridge's side of the MQTT connection.
//!
//! `BrokerClient` is the seam the relay talks to; `mqtt` implements it on top
//! of rumqttc and runs the event loop that turns broker traffic into relay
//! events.

pub mod client;
pub mod mqtt;
pub mod topic;

pub use client::BrokerClient;
pub use mqtt::{BrokerEventLoop, MqttBrokerClient};

#[cfg(test)]
pub(crate) mod testing;
