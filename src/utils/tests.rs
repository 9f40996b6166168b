use super::BridgeError;
use super::logging;

#[test]
fn logging_init_accepts_levels() {
    // try_init underneath, so repeated calls must not panic
    logging::init("info");
    logging::init("debug");
    logging::init("warn");
}

#[test]
fn parse_level_falls_back_to_info() {
    assert_eq!(logging::parse_level("WARNING"), tracing::Level::WARN);
    assert_eq!(logging::parse_level(" trace "), tracing::Level::TRACE);
    assert_eq!(logging::parse_level("chatty"), tracing::Level::INFO);
}

#[test]
fn malformed_payload_names_topic() {
    let source = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
    let err = BridgeError::MalformedPayload {
        topic: "cmnd/raja".to_string(),
        source,
    };
    assert!(err.to_string().starts_with("malformed payload on topic cmnd/raja"));
}

#[test]
fn invalid_client_message_converts_from_serde() {
    let serde_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let err: BridgeError = serde_err.into();
    assert!(matches!(err, BridgeError::InvalidClientMessage(_)));
}
