//! # Impersonation
//!
//! The attacker claims someone else's identity in a first-contact
//! advertisement and then has to answer the challenge without the key.
//! Wrong guesses, answers from the wrong address and responses recorded from
//! earlier rounds all leave the claim pending until it times out, and the
//! timeout distrusts the claimed identity.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::harness::{host_addr, SimulatedMesh};
    use rpl_guard::domain::SHARED_KEY;
    use rpl_guard::{Channel, NodeStatusApi, ProtocolConfig, Timestamp};

    fn response_for(nonce: u32) -> String {
        format!("AUTH-RESP {} {}", nonce, nonce ^ SHARED_KEY)
    }

    #[test]
    fn test_wrong_signature_never_grants_trust() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let node = mesh.add_guard(2);
        let attacker = host_addr(77);

        mesh.inject(node, attacker, Channel::Advertisement, "1 1 0 50");
        for guess in [0u32, 1, 12345, u32::MAX] {
            mesh.inject(node, attacker, Channel::Auth, &format!("AUTH-RESP 1 {guess}"));
        }

        let victim_view = mesh.guard(node);
        assert_eq!(victim_view.pending_challenges(), 1);
        assert_eq!(victim_view.stats().challenges_verified, 0);
        assert!(victim_view.node_state().parent.is_none());

        mesh.advance(Duration::from_secs(10));
        assert!(mesh.guard(node).trust_record(1).distrusted);
        assert_eq!(mesh.guard(node).pending_challenges(), 0);
    }

    #[test]
    fn test_failed_impersonation_locks_out_the_real_node() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let node = mesh.add_guard(2);
        mesh.inject(node, host_addr(77), Channel::Advertisement, "1 1 0 50");
        mesh.advance(Duration::from_secs(10));

        let root = mesh.add_guard(1);
        mesh.link(root, node);
        mesh.run_until(Timestamp::from_secs(40));

        let stranded = mesh.guard(node);
        assert!(stranded.trust_record(1).distrusted);
        assert!(stranded.node_state().parent.is_none());
        assert!(stranded.stats().advertisements_distrusted >= 5);
        assert_eq!(stranded.stats().challenges_issued, 1);
    }

    #[test]
    fn test_response_from_another_address_is_ignored() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let node = mesh.add_guard(2);

        mesh.inject(node, host_addr(77), Channel::Advertisement, "1 1 0 50");
        mesh.inject(node, host_addr(78), Channel::Auth, &response_for(1));

        let guard = mesh.guard(node);
        assert_eq!(guard.stats().challenges_verified, 0);
        assert_eq!(guard.pending_challenges(), 1);
        assert!(guard.trust_record(1).is_first_contact());
    }

    #[test]
    fn test_recorded_response_from_earlier_round_is_rejected() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let node = mesh.add_guard(3);

        // Honest round with nonce 1, observed by the attacker.
        mesh.inject(node, host_addr(2), Channel::Advertisement, "2 1 500 1");
        mesh.inject(node, host_addr(2), Channel::Auth, &response_for(1));
        assert!(mesh.guard(node).trust_record(2).last_accepted_counter > 0);

        // The attacker claims a new identity and replays the old response.
        mesh.inject(node, host_addr(5), Channel::Advertisement, "5 1 0 1");
        mesh.inject(node, host_addr(5), Channel::Auth, &response_for(1));

        let guard = mesh.guard(node);
        assert_eq!(guard.stats().challenges_verified, 1);
        assert_eq!(guard.pending_challenges(), 1);
        let pending = guard
            .processor()
            .authenticator()
            .pending_for(&host_addr(5))
            .unwrap();
        assert_eq!(pending.nonce, 2);
        assert_eq!(guard.node_state().parent_id(), Some(2));
    }
}
