//! # Configuration Management
//!
//! Network profiles and crate-level configuration.
//!
//! A [`NetworkProfile`] is the only thing the framing core needs: the magic
//! value stamped on every header and the largest payload a peer may declare.
//! [`WireConfig`] wraps a profile together with parser and logging settings so
//! an application can load everything from one TOML file.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` or `from_toml()`
//! - Environment variables via `from_env()`
//! - Direct instantiation with defaults
//!
//! ## Security Considerations
//! - `max_message_size` bounds the allocation a single header can trigger
//! - Profiles for different networks differ in magic, so cross-network
//!   traffic is rejected at the first header

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{warn, Level};

/// Largest payload accepted by default (4,000,000 bytes)
pub const MAX_MESSAGE_SIZE: u32 = 4_000_000;

/// Magic value of the main network
pub const MAIN_MAGIC: u32 = 0xd9b4_bef9;

/// Magic value of the public test network
pub const TESTNET_MAGIC: u32 = 0x0709_110b;

/// Magic value of the regression test network
pub const REGTEST_MAGIC: u32 = 0xdab5_bffa;

/// Magic value of the simulation network
pub const SIMNET_MAGIC: u32 = 0x1214_1c16;

/// Upper bound `validate()` accepts for `max_message_size` (32 MB)
const MAX_RECOMMENDED_MESSAGE_SIZE: u32 = 32 * 1024 * 1024;

/// Magic value and size limit for one protocol variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkProfile {
    magic: u32,
    max_message_size: u32,
}

impl NetworkProfile {
    pub const fn new(magic: u32, max_message_size: u32) -> Self {
        Self {
            magic,
            max_message_size,
        }
    }

    /// Magic value expected in bytes 0..4 of every header
    pub const fn magic(&self) -> u32 {
        self.magic
    }

    /// Largest payload size a header may declare
    pub const fn max_message_size(&self) -> u32 {
        self.max_message_size
    }

    /// Same magic, different size limit
    pub const fn with_max_message_size(self, max_message_size: u32) -> Self {
        Self {
            magic: self.magic,
            max_message_size,
        }
    }
}

impl Default for NetworkProfile {
    fn default() -> Self {
        Network::Main.profile()
    }
}

/// Named network variants with well-known magic values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Main,
    Testnet,
    Regtest,
    Simnet,
}

impl Network {
    pub const fn magic(self) -> u32 {
        match self {
            Network::Main => MAIN_MAGIC,
            Network::Testnet => TESTNET_MAGIC,
            Network::Regtest => REGTEST_MAGIC,
            Network::Simnet => SIMNET_MAGIC,
        }
    }

    pub const fn profile(self) -> NetworkProfile {
        NetworkProfile::new(self.magic(), MAX_MESSAGE_SIZE)
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
            Network::Simnet => "simnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Main),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            "simnet" => Ok(Network::Simnet),
            other => Err(ProtocolError::ConfigError(format!(
                "Unknown network: '{other}' (expected main, testnet, regtest or simnet)"
            ))),
        }
    }
}

/// What the parser does after a header with the wrong magic value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncPolicy {
    /// Treat the next 24 bytes as a header, whatever they hold
    #[default]
    Reinterpret,
    /// Slide forward to the next occurrence of the magic value
    ScanForMagic,
}

impl FromStr for ResyncPolicy {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reinterpret" => Ok(ResyncPolicy::Reinterpret),
            "scan" | "scan_for_magic" => Ok(ResyncPolicy::ScanForMagic),
            other => Err(ProtocolError::ConfigError(format!(
                "Unknown resync policy: '{other}' (expected reinterpret or scan_for_magic)"
            ))),
        }
    }
}

/// Top-level configuration for applications embedding the framing layer
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WireConfig {
    /// Which network to speak
    #[serde(default)]
    pub network: NetworkSettings,

    /// Parser behaviour
    #[serde(default)]
    pub parser: ParserConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WireConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Build configuration from defaults plus whatever `lookup` returns for
    /// the `PEER_WIRE_*` variables. Unparseable values are logged and skipped.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("PEER_WIRE_NETWORK") {
            match name.parse::<Network>() {
                Ok(network) => config.network.network = network,
                Err(e) => warn!(error = %e, "Ignoring PEER_WIRE_NETWORK"),
            }
        }

        if let Some(magic) = lookup("PEER_WIRE_MAGIC") {
            match parse_u32(&magic) {
                Some(val) => config.network.magic = Some(val),
                None => warn!(value = %magic, "Ignoring unparseable PEER_WIRE_MAGIC"),
            }
        }

        if let Some(size) = lookup("PEER_WIRE_MAX_MESSAGE_SIZE") {
            match parse_u32(&size) {
                Some(val) => config.network.max_message_size = val,
                None => warn!(value = %size, "Ignoring unparseable PEER_WIRE_MAX_MESSAGE_SIZE"),
            }
        }

        if let Some(policy) = lookup("PEER_WIRE_RESYNC") {
            match policy.parse::<ResyncPolicy>() {
                Ok(val) => config.parser.resync = val,
                Err(e) => warn!(error = %e, "Ignoring PEER_WIRE_RESYNC"),
            }
        }

        if let Some(level) = lookup("PEER_WIRE_LOG_LEVEL") {
            match level.parse::<Level>() {
                Ok(val) => config.logging.log_level = val,
                Err(_) => warn!(value = %level, "Ignoring unparseable PEER_WIRE_LOG_LEVEL"),
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// The profile parsers and framers should be built against
    pub fn profile(&self) -> NetworkProfile {
        self.network.profile()
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.network.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Network selection, with optional overrides of the preset values
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkSettings {
    /// Named network preset
    #[serde(default)]
    pub network: Network,

    /// Custom magic value; replaces the preset's when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic: Option<u32>,

    /// Maximum payload size in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: u32,
}

fn default_max_message_size() -> u32 {
    MAX_MESSAGE_SIZE
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            network: Network::Main,
            magic: None,
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}

impl NetworkSettings {
    pub fn profile(&self) -> NetworkProfile {
        let magic = self.magic.unwrap_or_else(|| self.network.magic());
        NetworkProfile::new(magic, self.max_message_size)
    }

    /// Validate network settings
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.magic == Some(0) {
            errors.push("Magic value cannot be 0".to_string());
        }

        if self.max_message_size == 0 {
            errors.push("Max message size cannot be 0".to_string());
        } else if self.max_message_size > MAX_RECOMMENDED_MESSAGE_SIZE {
            errors.push(format!(
                "Max message size too large: {} bytes (maximum recommended: 32 MB)",
                self.max_message_size
            ));
        }

        errors
    }
}

/// Parser configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Recovery strategy after an invalid magic value
    #[serde(default)]
    pub resync: ResyncPolicy,

    /// Whether parsers built from this config report to the global metrics
    #[serde(default)]
    pub collect_metrics: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("peer-wire"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Accepts decimal or `0x`-prefixed hexadecimal
fn parse_u32(value: &str) -> Option<u32> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
