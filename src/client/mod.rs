//! The `client` module defines how connected WebSocket sessions are tracked.
//!
//! It provides the `Client` struct, which encapsulates the state of a single
//! connected session, and the `ClientRegistry` that owns every live session and
//! fans messages out to them.

pub mod pubsub_client;
pub mod registry;

pub use pubsub_client::{Client, ClientId};
pub use registry::ClientRegistry;

#[cfg(test)]
mod tests;
