//! Challenge-Response Authenticator
//!
//! Seeds trust for a previously unseen sender. Per address the state machine is
//!
//! ```text
//! NONE ──begin_challenge──→ PENDING ──valid response──→ VERIFIED
//!                              │
//!                              └──deadline reached───→ TIMED_OUT (sender distrusted)
//! ```
//!
//! The pool holds at most `capacity` entries. A second first-contact
//! advertisement from an address that is already PENDING refreshes the claimed
//! fields in place. When the pool is full new first contacts are dropped.
//!
//! # Security
//!
//! Failures are never retried from this side. A timeout converts into
//! permanent distrust of the claimed sender id (fail-closed).

mod pool;
mod signing;

pub use pool::{ChallengePool, PendingChallenge};
pub use signing::{sign_nonce, verify_signature};

use std::time::Duration;

use tracing::{debug, info};

use crate::domain::{
    Advertisement, AuthMessage, Counter, NodeId, Nonce, ParentChange, PeerAddr, PeerTrustStore,
    Timestamp, TopologySelector,
};

/// Result of [`ChallengeResponseAuthenticator::begin_challenge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// A new slot was allocated; the challenge must be sent
    Issued {
        /// Nonce to send in `AUTH-REQ`
        nonce: Nonce,
    },
    /// The address already had a challenge in flight; claim refreshed
    Refreshed {
        /// Nonce of the existing challenge
        nonce: Nonce,
    },
    /// No free slot; nothing was issued
    PoolExhausted,
}

/// Result of [`ChallengeResponseAuthenticator::on_response_received`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseVerdict {
    /// Response matched; the claimed counter was committed
    Verified {
        /// Sender id that is now trusted
        sender_id: NodeId,
        /// Counter committed to the trust store
        counter: Counter,
        /// Parent adoption triggered by the claimed rank
        parent_change: Option<ParentChange>,
    },
    /// Response matched, but the claimed sender was distrusted in the meantime
    SenderDistrusted {
        /// Sender id of the released claim
        sender_id: NodeId,
    },
    /// Response matched, but the trust record already holds a higher counter.
    /// The slot is released and nothing is committed.
    StaleClaim {
        /// Sender id of the released claim
        sender_id: NodeId,
        /// Counter carried by the claim
        counter: Counter,
        /// Counter already held for the sender
        last_accepted: Counter,
    },
    /// No challenge is pending for the responding address
    UnknownAddress,
    /// The nonce does not match the pending challenge
    NonceMismatch {
        /// Nonce of the pending challenge
        expected: Nonce,
        /// Nonce in the response
        received: Nonce,
    },
    /// The tag is not `nonce XOR key`
    BadSignature,
}

impl ResponseVerdict {
    /// Whether the response established trust.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

/// Bounded pool of in-flight challenges plus nonce issuance.
#[derive(Debug, Clone)]
pub struct ChallengeResponseAuthenticator {
    pool: ChallengePool,
    next_nonce: Nonce,
    shared_key: u32,
    timeout: Duration,
}

impl ChallengeResponseAuthenticator {
    /// Create an authenticator with `capacity` challenge slots.
    pub fn new(capacity: usize, shared_key: u32, timeout: Duration) -> Self {
        Self {
            pool: ChallengePool::new(capacity),
            next_nonce: 1,
            shared_key,
            timeout,
        }
    }

    /// Pending challenges.
    pub fn pool(&self) -> &ChallengePool {
        &self.pool
    }

    /// Pending challenge for `address`.
    pub fn pending_for(&self, address: &PeerAddr) -> Option<&PendingChallenge> {
        self.pool.find(address)
    }

    /// Earliest challenge deadline.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.pool.next_deadline()
    }

    /// Start (or refresh) a challenge for `address` claiming `claimed`.
    ///
    /// On [`ChallengeOutcome::Issued`] the caller must send
    /// `AUTH-REQ <nonce>` to `address`.
    pub fn begin_challenge(
        &mut self,
        address: PeerAddr,
        claimed: Advertisement,
        now: Timestamp,
    ) -> ChallengeOutcome {
        if let Some(pending) = self.pool.find_mut(&address) {
            pending.claimed = claimed;
            debug!(
                peer = %address,
                sender_id = claimed.sender_id,
                counter = claimed.counter,
                "Refreshed pending challenge claim"
            );
            return ChallengeOutcome::Refreshed {
                nonce: pending.nonce,
            };
        }

        if self.pool.is_full() {
            debug!(peer = %address, "Challenge pool full, dropping first contact");
            return ChallengeOutcome::PoolExhausted;
        }

        let nonce = self.next_nonce;
        let challenge = PendingChallenge {
            peer_address: address,
            claimed,
            nonce,
            deadline: now.add(self.timeout),
        };
        if self.pool.insert(challenge).is_err() {
            return ChallengeOutcome::PoolExhausted;
        }
        self.next_nonce = self.next_nonce.wrapping_add(1);

        ChallengeOutcome::Issued { nonce }
    }

    /// Answer a challenge from any peer.
    ///
    /// Runs regardless of our own trust state: it proves key possession, not
    /// freshness.
    pub fn on_challenge_received(&self, nonce: Nonce) -> AuthMessage {
        AuthMessage::Response {
            nonce,
            signature: sign_nonce(nonce, self.shared_key),
        }
    }

    /// Validate a response and, on success, commit the claimed state.
    ///
    /// Mismatches leave the pending entry untouched so the genuine peer can
    /// still answer before the deadline.
    pub fn on_response_received(
        &mut self,
        address: PeerAddr,
        nonce: Nonce,
        signature: u32,
        trust: &mut PeerTrustStore,
        topology: &mut TopologySelector,
    ) -> ResponseVerdict {
        let Some(pending) = self.pool.find(&address) else {
            return ResponseVerdict::UnknownAddress;
        };

        if pending.nonce != nonce {
            return ResponseVerdict::NonceMismatch {
                expected: pending.nonce,
                received: nonce,
            };
        }

        if !verify_signature(nonce, signature, self.shared_key) {
            return ResponseVerdict::BadSignature;
        }

        let Some(pending) = self.pool.remove(&address) else {
            return ResponseVerdict::UnknownAddress;
        };
        let claimed = pending.claimed;

        if trust.is_distrusted(claimed.sender_id) {
            info!(
                sender_id = claimed.sender_id,
                "AUTH OK but sender already distrusted, discarding claim"
            );
            return ResponseVerdict::SenderDistrusted {
                sender_id: claimed.sender_id,
            };
        }

        if !trust.record_accepted(claimed.sender_id, claimed.counter) {
            let last_accepted = trust.lookup(claimed.sender_id).last_accepted_counter;
            info!(
                sender_id = claimed.sender_id,
                counter = claimed.counter,
                last_accepted,
                "AUTH OK but claim is behind trust record, discarding"
            );
            return ResponseVerdict::StaleClaim {
                sender_id: claimed.sender_id,
                counter: claimed.counter,
                last_accepted,
            };
        }
        let parent_change = topology.consider(claimed.sender_id, claimed.rank, address);

        match parent_change {
            Some(change) => info!(
                sender_id = claimed.sender_id,
                counter = claimed.counter,
                new_rank = change.new_rank,
                "AUTH OK; SELECT parent"
            ),
            None => info!(
                sender_id = claimed.sender_id,
                counter = claimed.counter,
                "AUTH OK; no parent change"
            ),
        }

        ResponseVerdict::Verified {
            sender_id: claimed.sender_id,
            counter: claimed.counter,
            parent_change,
        }
    }

    /// Expire overdue challenges, distrusting their claimed senders.
    ///
    /// Returns the released entries.
    pub fn on_timeout(
        &mut self,
        now: Timestamp,
        trust: &mut PeerTrustStore,
    ) -> Vec<PendingChallenge> {
        let expired = self.pool.drain_expired(now);
        for pending in &expired {
            info!(
                sender_id = pending.claimed.sender_id,
                peer = %pending.peer_address,
                nonce = pending.nonce,
                "AUTH timeout, distrusting sender"
            );
            trust.mark_distrusted(pending.claimed.sender_id);
        }
        expired
    }
}
