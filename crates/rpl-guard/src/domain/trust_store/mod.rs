//! Peer Trust Store
//!
//! Fixed-capacity table of per-sender freshness counters and the permanent
//! distrust set.
//!
//! # Security
//!
//! Records are indexed by `sender_id mod capacity` with no secondary key, so
//! two senders whose ids collide share a single record. This keeps memory
//! bounded at the cost of making colliding senders indistinguishable.

mod record;

pub use record::PeerTrustRecord;

use crate::domain::{Counter, NodeId};

/// Per-sender trust state, allocated once at startup.
#[derive(Debug, Clone)]
pub struct PeerTrustStore {
    records: Box<[PeerTrustRecord]>,
}

impl PeerTrustStore {
    /// Create a store with `capacity` zero-initialized records (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            records: vec![PeerTrustRecord::default(); capacity.max(1)].into_boxed_slice(),
        }
    }

    /// Number of records.
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Slot index for a sender.
    pub fn index_of(&self, sender_id: NodeId) -> usize {
        (sender_id as usize) % self.records.len()
    }

    /// Current record for a sender.
    pub fn lookup(&self, sender_id: NodeId) -> PeerTrustRecord {
        self.records[self.index_of(sender_id)]
    }

    /// Whether the sender has been permanently distrusted.
    pub fn is_distrusted(&self, sender_id: NodeId) -> bool {
        self.lookup(sender_id).distrusted
    }

    /// Whether nothing has ever been accepted from the sender.
    pub fn is_first_contact(&self, sender_id: NodeId) -> bool {
        self.lookup(sender_id).is_first_contact()
    }

    /// Commit an accepted counter.
    ///
    /// The stored counter never decreases and distrusted records are never
    /// touched. Returns `true` if the record now holds `counter`.
    pub fn record_accepted(&mut self, sender_id: NodeId, counter: Counter) -> bool {
        let idx = self.index_of(sender_id);
        let record = &mut self.records[idx];
        if record.distrusted || counter < record.last_accepted_counter {
            return false;
        }
        record.last_accepted_counter = counter;
        true
    }

    /// Permanently distrust a sender.
    ///
    /// Idempotent. Returns `true` only on the first call for this record.
    pub fn mark_distrusted(&mut self, sender_id: NodeId) -> bool {
        let idx = self.index_of(sender_id);
        let record = &mut self.records[idx];
        let newly = !record.distrusted;
        record.last_accepted_counter = Counter::MAX;
        record.distrusted = true;
        newly
    }

    /// Records that have accepted at least one advertisement and are not distrusted.
    pub fn trusted_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.distrusted && r.last_accepted_counter > 0)
            .count()
    }

    /// Records in the distrust set.
    pub fn distrusted_count(&self) -> usize {
        self.records.iter().filter(|r| r.distrusted).count()
    }
}

impl Default for PeerTrustStore {
    fn default() -> Self {
        Self::new(crate::domain::TRUST_TABLE_SIZE)
    }
}
