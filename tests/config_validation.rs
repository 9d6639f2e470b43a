//! Integration tests for configuration loading and validation

#![allow(clippy::expect_used, clippy::unwrap_used)]

use peer_wire::config::{LoggingConfig, NetworkSettings, ParserConfig, TESTNET_MAGIC};
use peer_wire::{
    Framer, Network, Parser, ProtocolError, RawCodec, ResyncPolicy, WireConfig, MAX_MESSAGE_SIZE,
};
use std::collections::HashMap;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = WireConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
    assert_eq!(config.profile(), Network::Main.profile());
}

#[test]
fn test_zero_max_message_size() {
    let config = WireConfig::default_with_overrides(|c| c.network.max_message_size = 0);
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max message size cannot be 0")));
}

#[test]
fn test_excessive_max_message_size() {
    let config =
        WireConfig::default_with_overrides(|c| c.network.max_message_size = 64 * 1024 * 1024);
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("too large")));
}

#[test]
fn test_zero_magic_rejected() {
    let config = WireConfig::default_with_overrides(|c| c.network.magic = Some(0));
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Magic value cannot be 0")));
}

#[test]
fn test_empty_app_name() {
    let config = WireConfig::default_with_overrides(|c| c.logging.app_name = String::new());
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_validate_strict_collects_all_errors() {
    let config = WireConfig {
        network: NetworkSettings {
            network: Network::Main,
            magic: Some(0),
            max_message_size: 0,
        },
        parser: ParserConfig::default(),
        logging: LoggingConfig {
            app_name: "x".repeat(65),
            ..LoggingConfig::default()
        },
    };

    match config.validate_strict() {
        Err(ProtocolError::ConfigError(msg)) => {
            assert!(msg.contains("Magic value cannot be 0"));
            assert!(msg.contains("Max message size cannot be 0"));
            assert!(msg.contains("Application name too long"));
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_from_toml_sections() {
    let toml = r#"
        [network]
        network = "testnet"
        max_message_size = 100000

        [parser]
        resync = "scan_for_magic"

        [logging]
        app_name = "relay"
        log_level = "debug"
        json_format = true
    "#;

    let config = WireConfig::from_toml(toml).expect("valid toml");
    assert_eq!(config.network.network, Network::Testnet);
    assert_eq!(config.profile().magic(), TESTNET_MAGIC);
    assert_eq!(config.profile().max_message_size(), 100_000);
    assert_eq!(config.parser.resync, ResyncPolicy::ScanForMagic);
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json_format);
}

#[test]
fn test_from_toml_partial_uses_defaults() {
    let config = WireConfig::from_toml("[network]\nmagic = 3405691582\n").expect("valid toml");
    assert_eq!(config.profile().magic(), 0xCAFE_BABE);
    assert_eq!(config.profile().max_message_size(), MAX_MESSAGE_SIZE);
    assert_eq!(config.parser.resync, ResyncPolicy::Reinterpret);
}

#[test]
fn test_from_toml_rejects_unknown_network() {
    let result = WireConfig::from_toml("[network]\nnetwork = \"moonnet\"\n");
    assert!(matches!(result, Err(ProtocolError::ConfigError(_))));
}

#[test]
fn test_invalid_log_level() {
    let toml = r#"
        [logging]
        app_name = "relay"
        log_level = "loud"
        json_format = false
    "#;
    let result = WireConfig::from_toml(toml);
    assert!(matches!(result, Err(ProtocolError::ConfigError(msg)) if msg.contains("Invalid log level")));
}

#[test]
fn test_env_overrides() {
    let vars: HashMap<&str, &str> = [
        ("PEER_WIRE_NETWORK", "regtest"),
        ("PEER_WIRE_MAX_MESSAGE_SIZE", "1024"),
        ("PEER_WIRE_RESYNC", "scan"),
        ("PEER_WIRE_LOG_LEVEL", "warn"),
    ]
    .into_iter()
    .collect();

    let config =
        WireConfig::from_env_with(|key| vars.get(key).map(|v| v.to_string())).expect("env");
    assert_eq!(config.network.network, Network::Regtest);
    assert_eq!(config.profile().max_message_size(), 1024);
    assert_eq!(config.parser.resync, ResyncPolicy::ScanForMagic);
    assert_eq!(config.logging.log_level, Level::WARN);
}

#[test]
fn test_env_hex_magic_and_bad_values() {
    let vars: HashMap<&str, &str> = [
        ("PEER_WIRE_MAGIC", "0xfabfb5da"),
        ("PEER_WIRE_MAX_MESSAGE_SIZE", "lots"),
        ("PEER_WIRE_NETWORK", "moonnet"),
    ]
    .into_iter()
    .collect();

    let config =
        WireConfig::from_env_with(|key| vars.get(key).map(|v| v.to_string())).expect("env");
    assert_eq!(config.profile().magic(), 0xfabf_b5da);
    // Unparseable values fall back to defaults
    assert_eq!(config.profile().max_message_size(), MAX_MESSAGE_SIZE);
    assert_eq!(config.network.network, Network::Main);
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wire.toml");

    let config = WireConfig::default_with_overrides(|c| {
        c.network.network = Network::Simnet;
        c.parser.resync = ResyncPolicy::ScanForMagic;
        c.parser.collect_metrics = true;
    });
    config.save_to_file(&path).expect("save");

    let loaded = WireConfig::from_file(&path).expect("load");
    assert_eq!(loaded.profile(), Network::Simnet.profile());
    assert_eq!(loaded.parser.resync, ResyncPolicy::ScanForMagic);
    assert!(loaded.parser.collect_metrics);
}

#[test]
fn test_missing_file() {
    let result = WireConfig::from_file("/nonexistent/peer-wire.toml");
    assert!(matches!(result, Err(ProtocolError::ConfigError(msg)) if msg.contains("open")));
}

#[test]
fn test_example_config_parses() {
    let example = WireConfig::example_config();
    let parsed = WireConfig::from_toml(&example).expect("example config parses");
    assert!(parsed.validate().is_empty());
}

#[test]
fn test_parser_from_config() {
    let config = WireConfig::default_with_overrides(|c| {
        c.network.network = Network::Testnet;
        c.network.max_message_size = 16;
        c.parser.resync = ResyncPolicy::ScanForMagic;
    });
    let parser = Parser::from_config(&config, RawCodec);
    assert_eq!(parser.profile().magic(), TESTNET_MAGIC);
    assert_eq!(parser.resync_policy(), ResyncPolicy::ScanForMagic);

    let framer = Framer::new(config.profile());
    assert!(matches!(
        framer.packet("block", &[0u8; 17], None),
        Err(ProtocolError::OversizedMessage { size: 17, max: 16 })
    ));
}
