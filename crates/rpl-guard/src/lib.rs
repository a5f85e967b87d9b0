//! # RPL Replay Guard
//!
//! Replay-resistant processing of topology advertisements for a tree-forming
//! mesh routing protocol.
//!
//! Every node periodically multicasts an advertisement `"<id> <version> <rank>
//! <counter>"`. The first advertisement heard from a sender triggers a
//! challenge-response round over a pre-shared key; once it succeeds, later
//! advertisements from that sender are accepted only if their counter does
//! not go backwards. A sender that fails the challenge in time is distrusted
//! for the lifetime of the node.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** codec, trust store, authenticator, processor, topology
//!   selector and the replay adversary. No I/O.
//! - **Ports Layer:** transport, clock and configuration traits
//! - **Service Layer:** [`GuardNode`] and [`ReplayNode`], driven one event at a time
//! - **Adapters Layer:** UDP transport, monotonic clock, TOML configuration
//!   (feature `network`)
//!
//! ## Example
//!
//! ```rust
//! use std::net::{IpAddr, Ipv6Addr};
//! use rpl_guard::{AdvertisementProcessor, Advertisement, AdvertisementVerdict, ProtocolConfig, Timestamp};
//!
//! let config = ProtocolConfig::default();
//! let mut processor = AdvertisementProcessor::new(2, &config);
//! let neighbour = IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 3));
//!
//! // First contact: a challenge has to be sent before anything is trusted.
//! let verdict = processor.process_advertisement(neighbour, Advertisement::new(3, 1, 0, 1), Timestamp::ZERO);
//! assert_eq!(verdict, AdvertisementVerdict::ChallengeIssued { nonce: 1 });
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// FEATURE-GATED MODULES
// =============================================================================

/// Adapters for real sockets, clocks and configuration files.
/// Requires feature: `network`
#[cfg(feature = "network")]
pub mod adapters;

/// Test utilities (ManualTimeSource, RecordingTransport)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// CORE RE-EXPORTS
// =============================================================================

// Domain entities and value objects
pub use domain::{
    derive_node_id, Advertisement, AuthMessage, Channel, ChannelPorts, CodecError, Counter,
    DataMessage, NodeId, NodeState, Nonce, ParentChange, ParentRef, PeerAddr, PeerTrustRecord,
    ProtocolConfig, Rank, Timestamp, WirePayload,
};

// Domain components
pub use domain::{
    AdversaryReplayEngine, AdvertisementProcessor, AdvertisementVerdict, ChallengeOutcome,
    ChallengeResponseAuthenticator, PeerTrustStore, ResponseVerdict, TopologySelector,
};

// Port traits
pub use ports::{
    ConfigProvider, DatagramTransport, NodeEvent, NodeStats, NodeStatusApi,
    ProtocolEventHandler, TimeSource, TransportError,
};

// Services
pub use service::{GuardNode, ReplayNode};

// =============================================================================
// ADAPTER RE-EXPORTS (Feature-Gated)
// =============================================================================

#[cfg(feature = "network")]
pub use adapters::{
    ConfigError, MonotonicTimeSource, StaticConfigProvider, TomlConfigProvider, TransportSettings,
    UdpDatagramTransport,
};
