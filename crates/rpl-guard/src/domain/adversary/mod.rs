//! Adversary Replay Engine
//!
//! Attacker-side logic: capture the first advertisement heard and re-transmit
//! the exact bytes after `replay_delay`, then every `replay_period`, forever.
//! The payload is opaque; nothing is decoded, signed or adjusted.

use std::time::Duration;

use tracing::info;

use crate::domain::{PeerAddr, Timestamp};

/// Longest payload the attacker keeps.
pub const MAX_CAPTURE_LEN: usize = 255;

/// The captured advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAdvertisement {
    /// Verbatim bytes (truncated to [`MAX_CAPTURE_LEN`])
    pub raw_payload: Vec<u8>,
    /// Address the original was heard from
    pub source: PeerAddr,
    /// When it was captured
    pub captured_at: Timestamp,
}

/// Capture-once, replay-forever state machine.
#[derive(Debug, Clone)]
pub struct AdversaryReplayEngine {
    captured: Option<CapturedAdvertisement>,
    next_replay_at: Option<Timestamp>,
    replay_delay: Duration,
    replay_period: Duration,
    replays_sent: u64,
}

impl AdversaryReplayEngine {
    /// Create an engine with the given schedule.
    pub fn new(replay_delay: Duration, replay_period: Duration) -> Self {
        Self {
            captured: None,
            next_replay_at: None,
            replay_delay,
            replay_period,
            replays_sent: 0,
        }
    }

    /// Whether an advertisement has been captured.
    pub fn has_captured(&self) -> bool {
        self.captured.is_some()
    }

    /// The captured advertisement, if any.
    pub fn captured(&self) -> Option<&CapturedAdvertisement> {
        self.captured.as_ref()
    }

    /// Number of replays emitted so far.
    pub fn replays_sent(&self) -> u64 {
        self.replays_sent
    }

    /// When the next replay is due.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.next_replay_at
    }

    /// Offer an overheard advertisement.
    ///
    /// Only the first non-empty payload is kept. Returns `true` if this call
    /// captured it.
    pub fn observe(&mut self, source: PeerAddr, payload: &[u8], now: Timestamp) -> bool {
        if self.captured.is_some() || payload.is_empty() {
            return false;
        }

        let raw_payload = payload[..payload.len().min(MAX_CAPTURE_LEN)].to_vec();
        info!(
            payload = %String::from_utf8_lossy(&raw_payload),
            from = %source,
            "Attacker CAPTURED advertisement"
        );
        self.captured = Some(CapturedAdvertisement {
            raw_payload,
            source,
            captured_at: now,
        });
        self.next_replay_at = Some(now.add(self.replay_delay));
        true
    }

    /// Payload to re-transmit if a replay is due at `now`.
    ///
    /// Re-arms the timer for one period after `now`.
    pub fn poll_replay(&mut self, now: Timestamp) -> Option<Vec<u8>> {
        let due = self.next_replay_at?;
        if !now.has_reached(due) {
            return None;
        }
        let captured = self.captured.as_ref()?;

        self.next_replay_at = Some(now.add(self.replay_period));
        self.replays_sent += 1;
        info!(
            payload = %String::from_utf8_lossy(&captured.raw_payload),
            replay = self.replays_sent,
            "Attacker REPLAYED captured advertisement"
        );
        Some(captured.raw_payload.clone())
    }
}

impl Default for AdversaryReplayEngine {
    fn default() -> Self {
        Self::new(
            crate::domain::REPLAY_DELAY,
            crate::domain::REPLAY_PERIOD,
        )
    }
}
