//! A `BrokerClient` double that records every request.

use std::sync::{Arc, Mutex};

use crate::broker::BrokerClient;
use crate::utils::{BridgeError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerCall {
    Subscribe(String),
    UnsubscribeAll,
    Publish(String, String),
    ResubscribeAll,
}

/// Clones share the call log, so a test can keep one while the relay owns
/// the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingBroker {
    calls: Arc<Mutex<Vec<BrokerCall>>>,
    offline: Arc<Mutex<bool>>,
}

impl RecordingBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BrokerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Makes every later request fail with `BrokerUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    fn record(&self, call: BrokerCall) -> Result<()> {
        if *self.offline.lock().unwrap() {
            return Err(BridgeError::BrokerUnavailable("offline".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl BrokerClient for RecordingBroker {
    fn subscribe(&mut self, topic: &str) -> Result<()> {
        self.record(BrokerCall::Subscribe(topic.to_string()))
    }

    fn unsubscribe_all(&mut self) -> Result<()> {
        self.record(BrokerCall::UnsubscribeAll)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        self.record(BrokerCall::Publish(
            topic.to_string(),
            String::from_utf8_lossy(payload).into_owned(),
        ))
    }

    fn resubscribe_all(&mut self) -> Result<()> {
        self.record(BrokerCall::ResubscribeAll)
    }
}
