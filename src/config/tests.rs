use std::io::Write;

use rumqttc::QoS;
use serial_test::serial;

use super::settings::Settings;
use super::{load_config, load_config_from};
use crate::utils::BridgeError;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 5000);
    assert_eq!(settings.broker.host, "localhost");
    assert_eq!(settings.broker.port, 1883);
    assert_eq!(settings.broker.keep_alive_secs, 60);
    assert!(!settings.broker.tls);
    assert_eq!(settings.relay.command_topic, "cmnd/raja");
    assert_eq!(settings.relay.status_topic, "stat/raja");
    assert_eq!(settings.relay.greeting.as_deref(), Some("Hi, MQTT!"));
    assert_eq!(settings.log.level, "info");
}

#[test]
fn test_broker_settings_conversions() {
    let mut settings = Settings::default();
    settings.broker.keep_alive_secs = 1;
    settings.broker.qos = 7;
    assert_eq!(settings.broker.keep_alive().as_secs(), 5);
    assert_eq!(settings.broker.qos(), QoS::ExactlyOnce);

    settings.broker.qos = 1;
    assert_eq!(settings.broker.qos(), QoS::AtLeastOnce);
}

#[test]
#[serial]
fn test_load_config_matches_defaults() {
    temp_env::with_vars_unset(
        ["BRIDGE_BROKER__HOST", "BRIDGE_RELAY__COMMAND_TOPIC"],
        || {
            let settings = load_config().unwrap();
            assert_eq!(settings.broker.host, "localhost");
            assert_eq!(settings.relay.command_topic, "cmnd/raja");
        },
    );
}

#[test]
#[serial]
fn test_file_values_merge_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[broker]\nhost = \"broker.hivemq.com\"\ntls = true\n\n[relay]\nstatus_topic = \"stat/kitchen\""
    )
    .unwrap();

    let settings = load_config_from(&path).unwrap();
    assert_eq!(settings.broker.host, "broker.hivemq.com");
    assert!(settings.broker.tls);
    assert_eq!(settings.broker.port, 1883);
    assert_eq!(settings.relay.status_topic, "stat/kitchen");
    assert_eq!(settings.relay.command_topic, "cmnd/raja");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    std::fs::write(&path, "[server]\nport = 6000\n").unwrap();

    temp_env::with_vars(
        [
            ("BRIDGE_SERVER__PORT", Some("7000")),
            ("BRIDGE_RELAY__COMMAND_TOPIC", Some("cmnd/+/power")),
        ],
        || {
            let settings = load_config_from(&path).unwrap();
            assert_eq!(settings.server.port, 7000);
            assert_eq!(settings.relay.command_topic, "cmnd/+/power");
        },
    );
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, BridgeError::Config(_)));
}

#[test]
#[serial]
fn test_malformed_value_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[server]\nport = \"not-a-port\"").unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(matches!(err, BridgeError::Config(_)));
}

#[test]
#[serial]
fn test_empty_greeting_disables_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[relay]\ngreeting = \"\"").unwrap();

    let settings = load_config_from(&path).unwrap();
    assert_eq!(settings.relay.greeting, None);
    assert_eq!(settings.relay.status_topic, "stat/raja");
}
