//! Trust record type.

use crate::domain::Counter;

/// Freshness and distrust state for one trust-table slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerTrustRecord {
    /// Highest counter ever accepted (`u32::MAX` once distrusted)
    pub last_accepted_counter: Counter,
    /// Sticky quarantine flag
    pub distrusted: bool,
}

impl PeerTrustRecord {
    /// No advertisement has been accepted and the sender is not distrusted.
    pub fn is_first_contact(&self) -> bool {
        self.last_accepted_counter == 0 && !self.distrusted
    }
}
