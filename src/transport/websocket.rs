//! WebSocket transport
//!
//! Accepts browser connections and turns each socket's lifecycle into relay
//! events:
//! - a successful handshake registers a `Client` (`ClientConnected`)
//! - text frames are parsed as `ClientMessage` and forwarded
//! - closing the socket, a read error or a failed write deregisters the
//!   client (`ClientDisconnected`), exactly once
//!
//! The transport never touches relay state directly; everything goes through
//! the `RelayHandle` queue.

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::{Client, ClientId};
use crate::relay::RelayHandle;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::{BridgeError, Result};

pub async fn start_websocket_server(addr: &str, relay: RelayHandle) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, relay).await
}

/// Accepts connections on `listener` until accepting fails or the relay
/// stops.
pub async fn serve(listener: TcpListener, relay: RelayHandle) -> Result<()> {
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        if relay.is_closed() {
            return Err(BridgeError::RelayClosed);
        }
        debug!(%peer, "accepted TCP connection");
        spawn(handle_connection(stream, relay.clone()));
    }
}

async fn handle_connection(stream: TcpStream, relay: RelayHandle) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(error = %e, "WebSocket handshake error");
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let client = Client::new(tx.clone());
    let client_id = client.id.clone();

    if relay.client_connected(client).is_err() {
        warn!(client = %client_id, "relay closed, dropping connection");
        return;
    }

    let cleanup_called = Arc::new(AtomicBool::new(false));

    let do_cleanup = {
        let relay = relay.clone();
        let client_id = client_id.clone();
        let cleanup_called = cleanup_called.clone();

        move || {
            if !cleanup_called.swap(true, Ordering::SeqCst) {
                let _ = relay.client_disconnected(client_id.clone());
            }
        }
    };

    {
        let client_id = client_id.clone();
        let do_cleanup = do_cleanup.clone();

        spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!(client = %client_id, error = %e, "failed to send message");
                    break;
                }
            }

            do_cleanup();
            debug!(client = %client_id, "send loop closed");
        });
    }

    while let Some(frame) = ws_receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                debug!(client = %client_id, error = %e, "read error");
                break;
            }
        };

        if msg.is_close() {
            break;
        }
        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else {
            continue;
        };

        if let Err(e) = dispatch(&relay, &client_id, &tx, text) {
            if matches!(e, BridgeError::RelayClosed) {
                break;
            }
            warn!(
                client = %client_id,
                error = %e,
                text = %text.chars().take(100).collect::<String>(),
                "invalid client message"
            );
        }
    }

    info!(client = %client_id, "client disconnected");
    do_cleanup();
}

/// Routes one text frame from `client_id`. Malformed frames are answered with
/// an `error` message to that client only.
fn dispatch(
    relay: &RelayHandle,
    client_id: &ClientId,
    tx: &mpsc::UnboundedSender<WsMessage>,
    text: &str,
) -> Result<()> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::ClientEvent { payload }) => {
            relay.client_publish(client_id.clone(), payload)
        }
        Ok(ClientMessage::Ping) => relay.poke(),
        Err(err) => {
            if let Ok(reply) = ServerMessage::error(format!("invalid message: {err}")).to_ws() {
                let _ = tx.send(reply);
            }
            Err(err.into())
        }
    }
}
