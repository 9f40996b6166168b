use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

use super::{Client, ClientRegistry};
use crate::utils::BridgeError;

fn client() -> (Client, mpsc::UnboundedReceiver<WsMessage>) {
    let (tx, rx) = mpsc::unbounded_channel::<WsMessage>();
    (Client::new(tx), rx)
}

#[test]
fn test_client_new() {
    let (client, _rx) = client();
    assert!(client.id.starts_with("client-"));
    assert!(client.is_open());
}

#[test]
fn test_client_ids_are_unique() {
    let (a, _rx_a) = client();
    let (b, _rx_b) = client();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_client_closed_when_receiver_dropped() {
    let (client, rx) = client();
    drop(rx);
    assert!(!client.is_open());
}

#[test]
fn test_registry_add_and_remove_report_counts() {
    let mut registry = ClientRegistry::new();
    let (a, _rx_a) = client();
    let (b, _rx_b) = client();
    let a_id = a.id.clone();
    let b_id = b.id.clone();

    assert_eq!(registry.add(a), 1);
    assert_eq!(registry.add(b), 2);
    assert!(registry.contains(&a_id));

    assert_eq!(registry.remove(&a_id), 1);
    assert_eq!(registry.remove(&a_id), 1);
    assert_eq!(registry.remove(&b_id), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_broadcast_reaches_every_client() {
    let mut registry = ClientRegistry::new();
    let (a, mut rx_a) = client();
    let (b, mut rx_b) = client();
    registry.add(a);
    registry.add(b);

    assert_eq!(registry.broadcast(WsMessage::text("hello")), 2);
    assert_eq!(rx_a.try_recv().unwrap(), WsMessage::text("hello"));
    assert_eq!(rx_b.try_recv().unwrap(), WsMessage::text("hello"));
}

#[test]
fn test_broadcast_isolates_broken_client() {
    let mut registry = ClientRegistry::new();
    let mut receivers = Vec::new();
    for _ in 0..3 {
        let (c, rx) = client();
        registry.add(c);
        receivers.push(rx);
    }
    let (broken, broken_rx) = client();
    registry.add(broken);
    drop(broken_rx);

    let delivered = registry.broadcast(WsMessage::text("still here"));

    assert_eq!(delivered, 3);
    for rx in receivers.iter_mut() {
        assert_eq!(rx.try_recv().unwrap(), WsMessage::text("still here"));
    }
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_send_to_unknown_client_fails() {
    let registry = ClientRegistry::new();
    let err = registry
        .send_to(&"client-missing".to_string(), WsMessage::text("x"))
        .unwrap_err();
    assert!(matches!(err, BridgeError::ClientSendFailure { .. }));
}

#[test]
fn test_send_to_targets_one_client() {
    let mut registry = ClientRegistry::new();
    let (a, mut rx_a) = client();
    let (b, mut rx_b) = client();
    let a_id = a.id.clone();
    registry.add(a);
    registry.add(b);

    registry.send_to(&a_id, WsMessage::text("only you")).unwrap();
    assert_eq!(rx_a.try_recv().unwrap(), WsMessage::text("only you"));
    assert!(rx_b.try_recv().is_err());
}
