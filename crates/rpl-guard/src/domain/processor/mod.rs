//! Advertisement Processor (Replay Detector)
//!
//! Decision sequence for an advertisement `a` arriving from `addr`:
//!
//! 1. `a.sender_id == self_id` → discard (echo suppression)
//! 2. sender distrusted → discard
//! 3. first contact → challenge `addr` (or refresh its pending claim); stop
//! 4. `a.counter < last_accepted_counter` → stale or replayed; discard
//! 5. commit `a.counter`, hand `a` to the topology selector
//!
//! # Security
//!
//! Only the first counter of a sender is trusted through a challenge-response
//! round. Afterwards every advertisement is checked by counter monotonicity
//! alone, so a captured advertisement becomes useless as soon as the genuine
//! sender has advanced past it. Replays inside the capture-to-propagation
//! window are not detectable.

use tracing::{debug, info};

use crate::domain::{
    Advertisement, AuthMessage, ChallengeOutcome, ChallengeResponseAuthenticator, Counter,
    NodeId, Nonce, ParentChange, PeerAddr, PeerTrustStore, PendingChallenge, ProtocolConfig,
    ResponseVerdict, Timestamp, TopologySelector,
};

/// Outcome of processing one advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisementVerdict {
    /// Our own advertisement echoed back
    EchoSuppressed,
    /// Sender is permanently distrusted
    Distrusted,
    /// First contact; a challenge must be sent to the source address
    ChallengeIssued {
        /// Nonce to send
        nonce: Nonce,
    },
    /// First contact from an address already being challenged
    ChallengeRefreshed {
        /// Nonce of the challenge in flight
        nonce: Nonce,
    },
    /// First contact dropped because the challenge pool is full
    PoolExhausted,
    /// Counter older than the last accepted one
    Stale {
        /// Counter carried by the advertisement
        counter: Counter,
        /// Highest counter accepted so far
        last_accepted: Counter,
    },
    /// Fresh advertisement from a trusted sender
    Accepted {
        /// Counter now committed
        counter: Counter,
        /// Parent adoption, if the advertisement improved our rank
        parent_change: Option<ParentChange>,
    },
}

impl AdvertisementVerdict {
    /// Whether the advertisement was acted upon.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Owns the trust store, the authenticator and the topology selector.
#[derive(Debug, Clone)]
pub struct AdvertisementProcessor {
    self_id: NodeId,
    trust: PeerTrustStore,
    auth: ChallengeResponseAuthenticator,
    topology: TopologySelector,
}

impl AdvertisementProcessor {
    /// Build a processor for node `self_id` from `config`.
    pub fn new(self_id: NodeId, config: &ProtocolConfig) -> Self {
        let topology = if self_id == config.root_id {
            TopologySelector::root(config.rank_increment)
        } else {
            TopologySelector::node(config.default_rank, config.rank_increment)
        };

        Self {
            self_id,
            trust: PeerTrustStore::new(config.trust_table_size),
            auth: ChallengeResponseAuthenticator::new(
                config.max_pending,
                config.shared_key,
                config.challenge_timeout,
            ),
            topology,
        }
    }

    /// Build a processor from explicit parts.
    pub fn with_parts(
        self_id: NodeId,
        trust: PeerTrustStore,
        auth: ChallengeResponseAuthenticator,
        topology: TopologySelector,
    ) -> Self {
        Self {
            self_id,
            trust,
            auth,
            topology,
        }
    }

    /// Our node id.
    pub fn self_id(&self) -> NodeId {
        self.self_id
    }

    /// Trust store.
    pub fn trust(&self) -> &PeerTrustStore {
        &self.trust
    }

    /// Authenticator.
    pub fn authenticator(&self) -> &ChallengeResponseAuthenticator {
        &self.auth
    }

    /// Topology selector.
    pub fn topology(&self) -> &TopologySelector {
        &self.topology
    }

    /// Process an advertisement received from `addr`.
    pub fn process_advertisement(
        &mut self,
        addr: PeerAddr,
        adv: Advertisement,
        now: Timestamp,
    ) -> AdvertisementVerdict {
        if adv.sender_id == self.self_id {
            return AdvertisementVerdict::EchoSuppressed;
        }

        let record = self.trust.lookup(adv.sender_id);

        if record.distrusted {
            info!(sender_id = adv.sender_id, "IGNORE advertisement from distrusted sender");
            return AdvertisementVerdict::Distrusted;
        }

        if record.is_first_contact() {
            return match self.auth.begin_challenge(addr, adv, now) {
                ChallengeOutcome::Issued { nonce } => {
                    AdvertisementVerdict::ChallengeIssued { nonce }
                }
                ChallengeOutcome::Refreshed { nonce } => {
                    AdvertisementVerdict::ChallengeRefreshed { nonce }
                }
                ChallengeOutcome::PoolExhausted => AdvertisementVerdict::PoolExhausted,
            };
        }

        if adv.counter < record.last_accepted_counter {
            info!(
                sender_id = adv.sender_id,
                counter = adv.counter,
                last = record.last_accepted_counter,
                "IGNORE old advertisement"
            );
            return AdvertisementVerdict::Stale {
                counter: adv.counter,
                last_accepted: record.last_accepted_counter,
            };
        }

        self.trust.record_accepted(adv.sender_id, adv.counter);
        let parent_change = self.topology.consider(adv.sender_id, adv.rank, addr);
        if let Some(change) = parent_change {
            info!(
                parent = change.parent.id,
                new_rank = change.new_rank,
                "SELECT parent"
            );
        } else {
            debug!(sender_id = adv.sender_id, counter = adv.counter, "Accepted advertisement");
        }

        AdvertisementVerdict::Accepted {
            counter: adv.counter,
            parent_change,
        }
    }

    /// Answer a challenge (unconditionally).
    pub fn process_challenge(&self, nonce: Nonce) -> AuthMessage {
        self.auth.on_challenge_received(nonce)
    }

    /// Validate a challenge response from `addr`.
    pub fn process_response(
        &mut self,
        addr: PeerAddr,
        nonce: Nonce,
        signature: u32,
    ) -> ResponseVerdict {
        self.auth.on_response_received(
            addr,
            nonce,
            signature,
            &mut self.trust,
            &mut self.topology,
        )
    }

    /// Expire overdue challenges and distrust their senders.
    pub fn expire_challenges(&mut self, now: Timestamp) -> Vec<PendingChallenge> {
        self.auth.on_timeout(now, &mut self.trust)
    }

    /// Earliest challenge deadline.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.auth.next_deadline()
    }
}
