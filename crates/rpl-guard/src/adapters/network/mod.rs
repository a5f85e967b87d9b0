//! # Network Adapters
//!
//! Production adapters for guard and adversary nodes.
//!
//! ## Adapters Provided
//!
//! - `MonotonicTimeSource` - Milliseconds since process start
//! - `UdpDatagramTransport` - One UDP socket per channel, multicast group join
//! - `StaticConfigProvider` / `TomlConfigProvider` - Protocol parameters

/// Configuration providers
pub mod config;
/// Time source adapters
pub mod time;
/// Transport adapters
pub mod transport;

pub use config::{ConfigError, StaticConfigProvider, TomlConfigProvider};
pub use time::MonotonicTimeSource;
pub use transport::{TransportSettings, UdpDatagramTransport, MAX_DATAGRAM_LEN};
