//! Value Objects for Advertisement Processing
//!
//! Protocol constants, the channel/port mapping and the configuration value
//! object that bundles them.

use std::time::Duration;

/// Symmetric key shared by every legitimate node.
pub const SHARED_KEY: u32 = 0xA5A5_A5A5;

/// How long a challenged sender has to answer.
pub const CHALLENGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Base period between our own advertisements.
pub const ADVERT_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound (exclusive) of the random jitter added to each advertisement period.
pub const ADVERT_JITTER: Duration = Duration::from_secs(1);

/// Delay before the first advertisement (jitter is added on top).
pub const FIRST_ADVERT_DELAY: Duration = Duration::from_secs(1);

/// Rank added per hop.
pub const RANK_INCREMENT: u32 = 10;

/// Rank a non-root node starts with.
pub const DEFAULT_RANK: u32 = 1_000_000;

/// Capacity of the in-flight challenge pool.
pub const MAX_PENDING: usize = 10;

/// Number of trust records (sender ids are folded modulo this value).
pub const TRUST_TABLE_SIZE: usize = 256;

/// Identifier of the tree root.
pub const ROOT_ID: u32 = 1;

/// Topology version carried in our advertisements.
pub const PROTOCOL_VERSION: u32 = 1;

/// Delay before the first application datagram.
pub const APP_INITIAL_DELAY: Duration = Duration::from_secs(5);

/// Period of application datagrams toward the root.
pub const APP_INTERVAL: Duration = Duration::from_secs(10);

/// Attacker: delay between capture and the first replay.
pub const REPLAY_DELAY: Duration = Duration::from_secs(12);

/// Attacker: period between replays.
pub const REPLAY_PERIOD: Duration = Duration::from_secs(10);

/// Logical datagram channels used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Topology advertisements (multicast)
    Advertisement,
    /// Challenge/response handshake (unicast)
    Auth,
    /// Application data forwarded toward the root (unicast)
    Data,
}

impl Channel {
    /// All channels in a fixed order.
    pub const ALL: [Channel; 3] = [Channel::Advertisement, Channel::Auth, Channel::Data];
}

/// Port assignment for each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPorts {
    /// Advertisement port (default 30000)
    pub advertisement: u16,
    /// Authentication port (default 30001)
    pub auth: u16,
    /// Application data port (default 40000)
    pub data: u16,
}

impl ChannelPorts {
    /// Port used for `channel`.
    pub fn port(&self, channel: Channel) -> u16 {
        match channel {
            Channel::Advertisement => self.advertisement,
            Channel::Auth => self.auth,
            Channel::Data => self.data,
        }
    }

    /// Channel bound to `port`, if any.
    pub fn channel(&self, port: u16) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| self.port(*c) == port)
    }
}

impl Default for ChannelPorts {
    fn default() -> Self {
        Self {
            advertisement: 30000,
            auth: 30001,
            data: 40000,
        }
    }
}

/// Protocol configuration.
///
/// # Security Notes
///
/// - `max_pending`: bounds the challenge pool. First-contact advertisements
///   arriving while the pool is full are dropped without a challenge.
/// - `trust_table_size`: sender ids are folded modulo this value, so colliding
///   senders share one trust record.
/// - `shared_key`: the response tag is `nonce XOR shared_key`. It proves key
///   possession against passive replay only; it is not a MAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Shared symmetric key
    pub shared_key: u32,
    /// Deadline for a challenge response
    pub challenge_timeout: Duration,
    /// Base advertisement period
    pub advert_interval: Duration,
    /// Exclusive upper bound of per-period jitter (zero disables jitter)
    pub advert_jitter: Duration,
    /// Delay before the first advertisement
    pub first_advert_delay: Duration,
    /// Rank added per hop
    pub rank_increment: u32,
    /// Starting rank for non-root nodes
    pub default_rank: u32,
    /// Pending challenge pool capacity
    pub max_pending: usize,
    /// Trust table capacity
    pub trust_table_size: usize,
    /// Identifier of the tree root
    pub root_id: u32,
    /// Topology version we advertise
    pub protocol_version: u32,
    /// Whether non-root nodes emit periodic application datagrams
    pub app_traffic: bool,
    /// Delay before the first application datagram
    pub app_initial_delay: Duration,
    /// Period between application datagrams
    pub app_interval: Duration,
    /// Attacker: capture-to-first-replay delay
    pub replay_delay: Duration,
    /// Attacker: replay period
    pub replay_period: Duration,
    /// Channel ports
    pub ports: ChannelPorts,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            shared_key: SHARED_KEY,
            challenge_timeout: CHALLENGE_TIMEOUT,
            advert_interval: ADVERT_INTERVAL,
            advert_jitter: ADVERT_JITTER,
            first_advert_delay: FIRST_ADVERT_DELAY,
            rank_increment: RANK_INCREMENT,
            default_rank: DEFAULT_RANK,
            max_pending: MAX_PENDING,
            trust_table_size: TRUST_TABLE_SIZE,
            root_id: ROOT_ID,
            protocol_version: PROTOCOL_VERSION,
            app_traffic: true,
            app_initial_delay: APP_INITIAL_DELAY,
            app_interval: APP_INTERVAL,
            replay_delay: REPLAY_DELAY,
            replay_period: REPLAY_PERIOD,
            ports: ChannelPorts::default(),
        }
    }
}

impl ProtocolConfig {
    /// Create a config suitable for testing: no jitter, small tables.
    pub fn for_testing() -> Self {
        Self {
            advert_jitter: Duration::ZERO,
            max_pending: 2,
            trust_table_size: 16,
            ..Self::default()
        }
    }
}
