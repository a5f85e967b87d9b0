//! Fixed-capacity pool of in-flight challenges.

use crate::domain::{Advertisement, Nonce, PeerAddr, Timestamp};

/// A challenge awaiting its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingChallenge {
    /// Address the challenge was sent to
    pub peer_address: PeerAddr,
    /// Most recent advertisement claimed from that address
    pub claimed: Advertisement,
    /// Nonce carried by the challenge
    pub nonce: Nonce,
    /// Instant after which the challenge counts as failed
    pub deadline: Timestamp,
}

/// Slot arena keyed by peer address. At most one entry per address.
#[derive(Debug, Clone)]
pub struct ChallengePool {
    slots: Box<[Option<PendingChallenge>]>,
}

impl ChallengePool {
    /// Create a pool with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
        }
    }

    /// Total slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no challenge is in flight.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Pending entry for `address`.
    pub fn find(&self, address: &PeerAddr) -> Option<&PendingChallenge> {
        self.slots
            .iter()
            .flatten()
            .find(|p| &p.peer_address == address)
    }

    /// Mutable pending entry for `address`.
    pub fn find_mut(&mut self, address: &PeerAddr) -> Option<&mut PendingChallenge> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|p| &p.peer_address == address)
    }

    /// Place `challenge` in the first free slot.
    ///
    /// Returns the challenge back if the pool is full.
    pub fn insert(&mut self, challenge: PendingChallenge) -> Result<(), PendingChallenge> {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(challenge);
                Ok(())
            }
            None => Err(challenge),
        }
    }

    /// Release the entry for `address`.
    pub fn remove(&mut self, address: &PeerAddr) -> Option<PendingChallenge> {
        self.slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|p| &p.peer_address == address))
            .and_then(Option::take)
    }

    /// Release and return every entry whose deadline has been reached.
    pub fn drain_expired(&mut self, now: Timestamp) -> Vec<PendingChallenge> {
        let mut expired = Vec::new();
        for slot in self.slots.iter_mut() {
            if slot.as_ref().is_some_and(|p| now.has_reached(p.deadline)) {
                expired.extend(slot.take());
            }
        }
        expired
    }

    /// Earliest deadline among pending entries.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.slots.iter().flatten().map(|p| p.deadline).min()
    }

    /// Iterate over pending entries.
    pub fn iter(&self) -> impl Iterator<Item = &PendingChallenge> {
        self.slots.iter().flatten()
    }
}
