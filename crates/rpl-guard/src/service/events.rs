//! Event dispatch for the guard node.
//!
//! Datagrams are decoded by channel and routed to the processor. Malformed
//! payloads are counted and dropped; they never change protocol state.

use tracing::{debug, info, warn};

use crate::domain::{
    Advertisement, AdvertisementVerdict, AuthMessage, Channel, DataMessage, PeerAddr,
    ResponseVerdict, Timestamp, WirePayload, ROOT_DESTINATION,
};
use crate::ports::{DatagramTransport, NodeEvent, ProtocolEventHandler};
use crate::service::GuardNode;

impl<T: DatagramTransport> ProtocolEventHandler for GuardNode<T> {
    fn handle_event(&mut self, event: NodeEvent) {
        let now = self.now();
        self.expire_challenges(now);

        match event {
            NodeEvent::Datagram {
                channel,
                from,
                payload,
            } => match channel {
                Channel::Advertisement => self.on_advertisement(from, &payload, now),
                Channel::Auth => self.on_auth(from, &payload),
                Channel::Data => self.on_data(from, &payload),
            },
            NodeEvent::TimerExpired => {}
        }

        self.run_due_jobs(now);
    }

    fn next_deadline(&self) -> Option<Timestamp> {
        Some(self.earliest_deadline())
    }

    fn channels(&self) -> &'static [Channel] {
        &Channel::ALL
    }
}

impl<T: DatagramTransport> GuardNode<T> {
    fn on_advertisement(&mut self, from: PeerAddr, payload: &[u8], now: Timestamp) {
        let adv = match Advertisement::decode(payload) {
            Ok(adv) => adv,
            Err(e) => return self.drop_malformed(Channel::Advertisement, from, e),
        };

        match self.processor.process_advertisement(from, adv, now) {
            AdvertisementVerdict::ChallengeIssued { nonce } => {
                self.stats.challenges_issued += 1;
                info!(sender_id = adv.sender_id, nonce, to = %from, "CHALLENGE issued");
                self.send_auth(from, AuthMessage::Challenge { nonce });
            }
            AdvertisementVerdict::ChallengeRefreshed { nonce } => {
                debug!(sender_id = adv.sender_id, nonce, "Challenge already pending");
            }
            AdvertisementVerdict::PoolExhausted => {
                self.stats.pool_exhausted += 1;
                warn!(sender_id = adv.sender_id, from = %from, "Challenge pool full, dropping");
            }
            AdvertisementVerdict::Distrusted => self.stats.advertisements_distrusted += 1,
            AdvertisementVerdict::Stale { .. } => self.stats.advertisements_stale += 1,
            AdvertisementVerdict::Accepted { .. } => self.stats.advertisements_accepted += 1,
            AdvertisementVerdict::EchoSuppressed => {}
        }
    }

    fn on_auth(&mut self, from: PeerAddr, payload: &[u8]) {
        let message = match AuthMessage::decode(payload) {
            Ok(message) => message,
            Err(e) => return self.drop_malformed(Channel::Auth, from, e),
        };

        match message {
            AuthMessage::Challenge { nonce } => {
                let reply = self.processor.process_challenge(nonce);
                self.stats.challenges_answered += 1;
                debug!(nonce, to = %from, "Answering challenge");
                self.send_auth(from, reply);
            }
            AuthMessage::Response { nonce, signature } => {
                match self.processor.process_response(from, nonce, signature) {
                    ResponseVerdict::Verified { .. } => self.stats.challenges_verified += 1,
                    ResponseVerdict::SenderDistrusted { sender_id } => {
                        self.stats.responses_from_distrusted += 1;
                        warn!(sender_id, from = %from, "Response for distrusted sender discarded");
                    }
                    ResponseVerdict::StaleClaim {
                        sender_id,
                        counter,
                        last_accepted,
                    } => {
                        self.stats.stale_claims += 1;
                        warn!(
                            sender_id,
                            counter,
                            last_accepted,
                            from = %from,
                            "Verified claim behind trust record discarded"
                        );
                    }
                    verdict => debug!(?verdict, from = %from, "Response not accepted"),
                }
            }
        }
    }

    fn on_data(&mut self, from: PeerAddr, payload: &[u8]) {
        let message = match DataMessage::decode(payload) {
            Ok(message) => message,
            Err(e) => return self.drop_malformed(Channel::Data, from, e),
        };

        if message.dst_id != ROOT_DESTINATION {
            debug!(dst = message.dst_id, "Dropping datagram not addressed to the root");
            return;
        }

        if self.processor.topology().is_root() {
            self.stats.data_delivered += 1;
            info!(src = message.src_id, token = %message.token, "DATA received at root");
            return;
        }

        let Some(parent) = self.processor.topology().parent() else {
            debug!(src = message.src_id, "No parent, dropping datagram");
            return;
        };

        match self.transport.unicast(parent.address, Channel::Data, payload) {
            Ok(()) => {
                self.stats.data_forwarded += 1;
                info!(src = message.src_id, parent = parent.id, "FORWARD data to parent");
            }
            Err(e) => warn!(error = %e, parent = parent.id, "Failed to forward datagram"),
        }
    }

    fn send_auth(&mut self, to: PeerAddr, message: AuthMessage) {
        if let Err(e) = self.transport.unicast(to, Channel::Auth, &message.encode()) {
            warn!(error = %e, to = %to, "Failed to send auth message");
        }
    }

    fn drop_malformed(&mut self, channel: Channel, from: PeerAddr, error: impl std::fmt::Display) {
        self.stats.malformed_datagrams += 1;
        debug!(?channel, from = %from, error = %error, "Dropping malformed datagram");
    }
}
