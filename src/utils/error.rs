//! The `error` module defines the error type used across the bridge.
//!
//! None of these errors is fatal once the relay is running: broker failures,
//! broken client channels and undecodable payloads are logged where they occur
//! and the relay keeps going. Only start-up errors (configuration, binding the
//! listener) reach `main`.

use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The broker request could not be queued (no live broker connection or
    /// the MQTT event loop is gone).
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("failed to send to client {client_id}")]
    ClientSendFailure { client_id: String },

    #[error("malformed payload on topic {topic}: {source}")]
    MalformedPayload {
        topic: String,
        #[source]
        source: FromUtf8Error,
    },

    #[error("invalid client message: {0}")]
    InvalidClientMessage(#[from] serde_json::Error),

    #[error("relay event queue is closed")]
    RelayClosed,

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<rumqttc::ClientError> for BridgeError {
    fn from(err: rumqttc::ClientError) -> Self {
        BridgeError::BrokerUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
