//! CLI for mqtt-socket-bridge
//!
//! Subcommands:
//! - `serve`: run the bridge (MQTT connection + WebSocket server)
//! - `client`: send one client event to a running bridge and print the replies

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mqtt_socket_bridge::broker::MqttBrokerClient;
use mqtt_socket_bridge::config::{Settings, load_config, load_config_from};
use mqtt_socket_bridge::relay::{RelayCore, RelayHandle};
use mqtt_socket_bridge::transport::websocket::start_websocket_server;
use mqtt_socket_bridge::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mqtt-socket-bridge")]
enum Command {
    /// Run the MQTT <-> WebSocket bridge
    Serve {
        /// Configuration file (defaults to `config/default.*` when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides `log.level` from the configuration
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Connect to a running bridge, publish one client event and print replies
    Client {
        /// WebSocket URL of the bridge
        #[arg(long, default_value = "ws://127.0.0.1:5000")]
        url: String,
        /// Payload published to the status topic
        #[arg(long, default_value = "ON")]
        payload: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    match Command::parse() {
        Command::Serve { config, log_level } => {
            let settings = match config {
                Some(path) => load_config_from(&path),
                None => load_config(),
            };
            let settings = match settings {
                Ok(settings) => settings,
                Err(e) => {
                    logging::init("info");
                    error!("Failed to load configuration: {}", e);
                    std::process::exit(1);
                }
            };
            logging::init(log_level.as_deref().unwrap_or(&settings.log.level));

            if let Err(e) = run_server(settings).await {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Client { url, payload } => {
            logging::init("info");
            if let Err(e) = run_client(&url, &payload).await {
                error!("Client failed: {}", e);
            }
        }
    }
}

async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let (relay, events) = RelayHandle::channel();
    let (broker, event_loop) = MqttBrokerClient::connect(&settings.broker);
    let core = RelayCore::new(broker, settings.relay.clone());

    tokio::spawn(core.run(events));
    tokio::spawn(event_loop.run(relay.clone()));

    tokio::select! {
        res = start_websocket_server(&addr, relay) => {
            res?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_client(url: &str, payload: &str) -> Result<(), Box<dyn std::error::Error>> {
    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (mut ws_stream, _response) = connect_async(url).await?;

    let event = json!({ "type": "client-event", "payload": payload });
    ws_stream
        .send(WsMessage::Text(event.to_string().into()))
        .await?;

    // Welcome, the publish acknowledgement and whatever the broker sends back
    // within a short window.
    while let Ok(Some(msg)) = tokio::time::timeout(Duration::from_secs(2), ws_stream.next()).await {
        if let WsMessage::Text(text) = msg? {
            println!("{text}");
        }
    }

    ws_stream.close(None).await?;
    Ok(())
}
