//! Replay adversary driven by the same event loop as honest nodes.
//!
//! Holds no shared key. Listens on the advertisement channel only.

use tracing::warn;

use crate::domain::{AdversaryReplayEngine, Channel, ProtocolConfig, Timestamp};
use crate::ports::{DatagramTransport, NodeEvent, ProtocolEventHandler, TimeSource};

/// Captures the first advertisement it hears and replays it periodically.
pub struct ReplayNode<T: DatagramTransport> {
    engine: AdversaryReplayEngine,
    transport: T,
    time_source: Box<dyn TimeSource>,
}

impl<T: DatagramTransport> ReplayNode<T> {
    /// Create an adversary using the replay schedule in `config`.
    pub fn new(config: &ProtocolConfig, transport: T, time_source: Box<dyn TimeSource>) -> Self {
        Self {
            engine: AdversaryReplayEngine::new(config.replay_delay, config.replay_period),
            transport,
            time_source,
        }
    }

    /// The replay state machine (for inspection).
    pub fn engine(&self) -> &AdversaryReplayEngine {
        &self.engine
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: DatagramTransport> ProtocolEventHandler for ReplayNode<T> {
    fn handle_event(&mut self, event: NodeEvent) {
        let now = self.time_source.now();

        if let NodeEvent::Datagram {
            channel: Channel::Advertisement,
            from,
            payload,
        } = event
        {
            self.engine.observe(from, &payload, now);
        }

        if let Some(payload) = self.engine.poll_replay(now) {
            if let Err(e) = self.transport.multicast(Channel::Advertisement, &payload) {
                warn!(error = %e, "Failed to send replay");
            }
        }
    }

    fn next_deadline(&self) -> Option<Timestamp> {
        self.engine.next_deadline()
    }

    fn channels(&self) -> &'static [Channel] {
        &[Channel::Advertisement]
    }
}
