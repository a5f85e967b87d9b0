//! Domain Entities for Advertisement Processing
//!
//! Advertisements, node/parent state and the millisecond clock used by every
//! deadline in the protocol.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Identifier a node announces in its advertisements.
pub type NodeId = u32;

/// Per-sender freshness counter carried by every advertisement.
pub type Counter = u32;

/// Topology rank (lower is closer to the root).
pub type Rank = u32;

/// Challenge nonce issued by the authenticator.
pub type Nonce = u32;

/// Network-layer address of a neighbour. Ports are implied by the channel.
pub type PeerAddr = IpAddr;

/// Destination id meaning "the root of the tree" in application data.
pub const ROOT_DESTINATION: NodeId = 0;

/// Topology advertisement as carried on the wire.
///
/// `counter` strictly increases per originating node; it is the only field the
/// replay detector relies on once a sender has been authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Advertisement {
    /// Identifier claimed by the sender
    pub sender_id: NodeId,
    /// Topology version
    pub version: u32,
    /// Sender's rank
    pub rank: Rank,
    /// Sender's freshness counter
    pub counter: Counter,
}

impl Advertisement {
    /// Create a new advertisement.
    pub fn new(sender_id: NodeId, version: u32, rank: Rank, counter: Counter) -> Self {
        Self {
            sender_id,
            version,
            rank,
            counter,
        }
    }
}

impl fmt::Display for Advertisement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.sender_id, self.version, self.rank, self.counter
        )
    }
}

/// The neighbour currently used as next hop toward the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    /// Parent's advertised identifier
    pub id: NodeId,
    /// Address the parent's advertisement arrived from
    pub address: PeerAddr,
}

/// Record of a parent adoption produced by the topology selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentChange {
    /// The newly adopted parent
    pub parent: ParentRef,
    /// Rank before the change
    pub previous_rank: Rank,
    /// Rank after the change
    pub new_rank: Rank,
}

/// Snapshot of a node's own protocol state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeState {
    /// Our identifier
    pub id: NodeId,
    /// Fixed at startup
    pub is_root: bool,
    /// Topology version we advertise
    pub version: u32,
    /// Current rank (only ever decreases)
    pub rank: Rank,
    /// Counter carried by the last advertisement we sent
    pub own_counter: Counter,
    /// Current parent, if one has been adopted
    pub parent: Option<ParentRef>,
}

impl NodeState {
    /// Parent identifier, if any.
    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent.map(|p| p.id)
    }

    /// Parent address, if any.
    pub fn parent_address(&self) -> Option<PeerAddr> {
        self.parent.map(|p| p.address)
    }
}

/// Derive a node identifier when none was configured.
///
/// A configured id of 0 falls back to the low 16 bits of the bound address,
/// and to 1 if that is also zero.
pub fn derive_node_id(configured: NodeId, address: Option<PeerAddr>) -> NodeId {
    if configured != 0 {
        return configured;
    }

    let derived = match address {
        Some(IpAddr::V6(v6)) => {
            let o = v6.octets();
            (u32::from(o[14]) << 8) | u32::from(o[15])
        }
        Some(IpAddr::V4(v4)) => {
            let o = v4.octets();
            (u32::from(o[2]) << 8) | u32::from(o[3])
        }
        None => 0,
    };

    if derived == 0 {
        1
    } else {
        derived
    }
}

/// Millisecond timestamp on the node's monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Clock origin.
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from milliseconds since the clock origin.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Create a timestamp from whole seconds since the clock origin.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Milliseconds since the clock origin.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Add a duration (saturating).
    pub fn add(&self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn saturating_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Whether `deadline` has been reached at this instant.
    pub fn has_reached(&self, deadline: Timestamp) -> bool {
        *self >= deadline
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}
