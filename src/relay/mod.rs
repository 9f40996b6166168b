//! The `relay` module is the core of the bridge.
//!
//! Every input (broker handshake, broker messages, client connects,
//! disconnects and publishes) becomes a [`RelayEvent`] on one queue. A single
//! [`RelayCore`] drains that queue and owns all mutable state: the client
//! registry, the subscription flag and the broker handle. Serialising events
//! this way is what keeps subscribe/unsubscribe consistent with the live
//! client count under concurrent connects and disconnects.

pub mod engine;
pub mod event;

pub use engine::{RelayCore, RelayState};
pub use event::{RelayEvent, RelayHandle};
