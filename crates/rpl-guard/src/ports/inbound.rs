//! # Driving Ports (Inbound API)
//!
//! The event interface the host event loop drives, and the read-only status
//! API exposed to operators and tests.

use crate::domain::{Channel, NodeId, NodeState, PeerAddr, PeerTrustRecord, Timestamp};

/// A raw event delivered by the host.
///
/// Events are processed strictly one at a time; each call runs to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// A datagram arrived on one of the channel ports
    Datagram {
        /// Channel the datagram arrived on
        channel: Channel,
        /// Source address
        from: PeerAddr,
        /// Raw bytes
        payload: Vec<u8>,
    },
    /// The deadline returned by [`ProtocolEventHandler::next_deadline`] was reached
    TimerExpired,
}

impl NodeEvent {
    /// Convenience constructor for a datagram event.
    pub fn datagram(channel: Channel, from: PeerAddr, payload: impl Into<Vec<u8>>) -> Self {
        Self::Datagram {
            channel,
            from,
            payload: payload.into(),
        }
    }
}

/// Driving port of a protocol node (guard or adversary).
///
/// # Example
///
/// ```rust,ignore
/// loop {
///     let event = wait_for_datagram_or(node.next_deadline()).await;
///     node.handle_event(event);
/// }
/// ```
pub trait ProtocolEventHandler {
    /// Process one event to completion.
    fn handle_event(&mut self, event: NodeEvent);

    /// Earliest instant at which a [`NodeEvent::TimerExpired`] is needed.
    fn next_deadline(&self) -> Option<Timestamp>;

    /// Channels this node listens on.
    fn channels(&self) -> &'static [Channel];
}

/// Counters describing what a node has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Senders with a committed counter
    pub trusted_peers: usize,
    /// Senders that failed a challenge
    pub distrusted_peers: usize,
    /// Advertisements we multicast
    pub advertisements_sent: u64,
    /// Advertisements accepted from trusted senders
    pub advertisements_accepted: u64,
    /// Advertisements rejected as stale/replayed
    pub advertisements_stale: u64,
    /// Advertisements dropped because the sender is distrusted
    pub advertisements_distrusted: u64,
    /// Challenges sent
    pub challenges_issued: u64,
    /// Responses that established trust
    pub challenges_verified: u64,
    /// Challenges that timed out
    pub challenges_expired: u64,
    /// Correct responses whose claimed sender was distrusted before they arrived
    pub responses_from_distrusted: u64,
    /// Correct responses whose claim was behind the sender's trust record
    pub stale_claims: u64,
    /// First contacts dropped for lack of a pool slot
    pub pool_exhausted: u64,
    /// Challenges we answered
    pub challenges_answered: u64,
    /// Datagrams that failed to decode
    pub malformed_datagrams: u64,
    /// Application datagrams forwarded to our parent
    pub data_forwarded: u64,
    /// Application datagrams consumed at the root
    pub data_delivered: u64,
    /// Application datagrams originated by this node
    pub data_originated: u64,
}

/// Read-only status of a guard node.
pub trait NodeStatusApi {
    /// Our own protocol state.
    fn node_state(&self) -> NodeState;

    /// Activity counters.
    fn stats(&self) -> NodeStats;

    /// Trust record currently held for `sender_id`.
    fn trust_record(&self, sender_id: NodeId) -> PeerTrustRecord;

    /// Number of challenges in flight.
    fn pending_challenges(&self) -> usize;
}
