//! The `transport` module is responsible for handling network communication
//! with browser clients via WebSockets.
//!
//! It defines the JSON messages exchanged with clients and implements the
//! WebSocket server, which turns connection lifecycle and client messages into
//! relay events.

pub mod message;
pub mod websocket;
