use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::transport::TransportSettings;
use crate::domain::{ChannelPorts, NodeId, ProtocolConfig};
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider.
///
/// Useful for tests and for running with built-in defaults. For deployments,
/// use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    node_id: NodeId,
    config: ProtocolConfig,
}

impl StaticConfigProvider {
    /// Default protocol parameters, node id derived from the address.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed node id.
    #[must_use]
    pub fn with_node_id(mut self, node_id: NodeId) -> Self {
        self.node_id = node_id;
        self
    }

    /// Use the given protocol parameters.
    #[must_use]
    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn get_node_id(&self) -> NodeId {
        self.node_id
    }

    fn get_protocol_config(&self) -> ProtocolConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - File-based configuration
// ============================================================================

/// Configuration file structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    node: NodeSection,
    #[serde(default)]
    protocol: ProtocolSection,
    #[serde(default)]
    ports: PortsSection,
    #[serde(default)]
    network: NetworkSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeSection {
    id: Option<NodeId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProtocolSection {
    shared_key: Option<u32>,
    challenge_timeout_ms: Option<u64>,
    advert_interval_ms: Option<u64>,
    advert_jitter_ms: Option<u64>,
    first_advert_delay_ms: Option<u64>,
    rank_increment: Option<u32>,
    default_rank: Option<u32>,
    max_pending: Option<usize>,
    trust_table_size: Option<usize>,
    root_id: Option<u32>,
    protocol_version: Option<u32>,
    app_traffic: Option<bool>,
    app_initial_delay_ms: Option<u64>,
    app_interval_ms: Option<u64>,
    replay_delay_ms: Option<u64>,
    replay_period_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortsSection {
    advertisement: Option<u16>,
    auth: Option<u16>,
    data: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkSection {
    bind: Option<String>,
    group: Option<String>,
    interface: Option<u32>,
}

/// TOML-based configuration provider.
///
/// Every key is optional; missing keys keep their defaults.
///
/// # Config File Format
///
/// ```toml
/// [node]
/// id = 2                      # 0 or absent: derive from the bound address
///
/// [protocol]
/// shared_key = 2779096485     # 0xA5A5A5A5
/// challenge_timeout_ms = 10000
/// advert_interval_ms = 5000
/// advert_jitter_ms = 1000
/// first_advert_delay_ms = 1000
/// rank_increment = 10
/// default_rank = 1000000
/// max_pending = 10
/// trust_table_size = 256
/// root_id = 1
/// protocol_version = 1
/// app_traffic = true
/// app_initial_delay_ms = 5000
/// app_interval_ms = 10000
/// replay_delay_ms = 12000
/// replay_period_ms = 10000
///
/// [ports]
/// advertisement = 30000
/// auth = 30001
/// data = 40000
///
/// [network]
/// bind = "::"
/// group = "ff02::1a"
/// interface = 0
/// ```
#[derive(Debug, Clone)]
pub struct TomlConfigProvider {
    node_id: NodeId,
    config: ProtocolConfig,
    transport: TransportSettings,
}

impl TomlConfigProvider {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error on malformed TOML, unknown keys, unparsable addresses
    /// or parameters that cannot work (zero-sized tables, zero interval).
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let config = Self::build_protocol_config(file.protocol, file.ports);
        validate(&config)?;

        let defaults = TransportSettings::new(config.ports);
        let transport = TransportSettings {
            bind: parse_addr("network.bind", file.network.bind)?.unwrap_or(defaults.bind),
            group: parse_addr("network.group", file.network.group)?.unwrap_or(defaults.group),
            interface: file.network.interface.unwrap_or(defaults.interface),
            ports: config.ports,
        };

        Ok(Self {
            node_id: file.node.id.unwrap_or(0),
            config,
            transport,
        })
    }

    /// Socket settings from the `[network]` and `[ports]` sections.
    pub fn transport_settings(&self) -> TransportSettings {
        self.transport
    }

    fn build_protocol_config(p: ProtocolSection, ports: PortsSection) -> ProtocolConfig {
        let d = ProtocolConfig::default();
        let ms = |value: Option<u64>, default: Duration| {
            value.map(Duration::from_millis).unwrap_or(default)
        };

        ProtocolConfig {
            shared_key: p.shared_key.unwrap_or(d.shared_key),
            challenge_timeout: ms(p.challenge_timeout_ms, d.challenge_timeout),
            advert_interval: ms(p.advert_interval_ms, d.advert_interval),
            advert_jitter: ms(p.advert_jitter_ms, d.advert_jitter),
            first_advert_delay: ms(p.first_advert_delay_ms, d.first_advert_delay),
            rank_increment: p.rank_increment.unwrap_or(d.rank_increment),
            default_rank: p.default_rank.unwrap_or(d.default_rank),
            max_pending: p.max_pending.unwrap_or(d.max_pending),
            trust_table_size: p.trust_table_size.unwrap_or(d.trust_table_size),
            root_id: p.root_id.unwrap_or(d.root_id),
            protocol_version: p.protocol_version.unwrap_or(d.protocol_version),
            app_traffic: p.app_traffic.unwrap_or(d.app_traffic),
            app_initial_delay: ms(p.app_initial_delay_ms, d.app_initial_delay),
            app_interval: ms(p.app_interval_ms, d.app_interval),
            replay_delay: ms(p.replay_delay_ms, d.replay_delay),
            replay_period: ms(p.replay_period_ms, d.replay_period),
            ports: ChannelPorts {
                advertisement: ports.advertisement.unwrap_or(d.ports.advertisement),
                auth: ports.auth.unwrap_or(d.ports.auth),
                data: ports.data.unwrap_or(d.ports.data),
            },
        }
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_node_id(&self) -> NodeId {
        self.node_id
    }

    fn get_protocol_config(&self) -> ProtocolConfig {
        self.config.clone()
    }
}

fn parse_addr(key: &'static str, value: Option<String>) -> Result<Option<IpAddr>, ConfigError> {
    value
        .map(|raw| {
            raw.parse().map_err(|_| ConfigError::Invalid {
                key,
                reason: format!("'{raw}' is not an IP address"),
            })
        })
        .transpose()
}

fn validate(config: &ProtocolConfig) -> Result<(), ConfigError> {
    if config.max_pending == 0 {
        return Err(ConfigError::Invalid {
            key: "protocol.max_pending",
            reason: "must be at least 1".to_string(),
        });
    }
    if config.trust_table_size == 0 {
        return Err(ConfigError::Invalid {
            key: "protocol.trust_table_size",
            reason: "must be at least 1".to_string(),
        });
    }
    if config.advert_interval.is_zero() {
        return Err(ConfigError::Invalid {
            key: "protocol.advert_interval_ms",
            reason: "must be positive".to_string(),
        });
    }
    if config.app_traffic && config.app_interval.is_zero() {
        return Err(ConfigError::Invalid {
            key: "protocol.app_interval_ms",
            reason: "must be positive when app_traffic is enabled".to_string(),
        });
    }
    if config.replay_period.is_zero() {
        return Err(ConfigError::Invalid {
            key: "protocol.replay_period_ms",
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

/// Errors that can occur during config loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },
    /// TOML parsing error.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// A value parsed but cannot be used.
    #[error("invalid {key}: {reason}")]
    Invalid {
        /// Offending key
        key: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
