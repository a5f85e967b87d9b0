//! # Adapters
//!
//! Concrete implementations of the outbound ports for running on a real host.

pub mod network;

pub use network::{
    ConfigError, MonotonicTimeSource, StaticConfigProvider, TomlConfigProvider, TransportSettings,
    UdpDatagramTransport,
};
