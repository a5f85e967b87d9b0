//! # Trust Establishment
//!
//! One neighbour at a time: the challenge that precedes trust, the response
//! that grants it and the silence that revokes it for good.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::harness::{host_addr, SimulatedMesh};
    use rpl_guard::domain::SHARED_KEY;
    use rpl_guard::{Channel, NodeStatusApi, ProtocolConfig, Timestamp};

    fn response_for(nonce: u32) -> String {
        format!("AUTH-RESP {} {}", nonce, nonce ^ SHARED_KEY)
    }

    // =========================================================================
    // FIRST CONTACT
    // =========================================================================

    #[test]
    fn test_first_contact_is_challenged_then_trusted() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let a = mesh.add_guard(3);
        let b = host_addr(2);

        mesh.inject(a, b, Channel::Advertisement, "2 1 500 1");
        let node = mesh.guard(a);
        assert_eq!(node.pending_challenges(), 1);
        assert!(node.trust_record(2).is_first_contact());
        assert!(node.node_state().parent.is_none());

        mesh.inject(a, b, Channel::Auth, &response_for(1));
        let node = mesh.guard(a);
        assert_eq!(node.trust_record(2).last_accepted_counter, 1);
        assert_eq!(node.node_state().parent_id(), Some(2));
        assert_eq!(node.node_state().rank, 510);
        assert_eq!(node.pending_challenges(), 0);
    }

    #[test]
    fn test_neighbours_authenticate_each_other() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let root = mesh.add_guard(1);
        let node = mesh.add_guard(2);
        mesh.link(root, node);

        mesh.run_until(Timestamp::from_secs(2));

        let child = mesh.guard(node);
        assert_eq!(child.node_state().parent_id(), Some(1));
        assert_eq!(child.node_state().rank, 10);
        assert_eq!(child.stats().challenges_verified, 1);
        assert_eq!(child.stats().challenges_answered, 1);

        let root = mesh.guard(root);
        assert_eq!(root.trust_record(2).last_accepted_counter, 1);
        assert_eq!(root.node_state().rank, 0);
        assert!(root.node_state().parent.is_none());
    }

    #[test]
    fn test_concurrent_first_contacts_share_one_challenge() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let a = mesh.add_guard(3);
        let b = host_addr(2);

        mesh.inject(a, b, Channel::Advertisement, "2 1 500 1");
        mesh.inject(a, b, Channel::Advertisement, "2 1 400 2");

        let node = mesh.guard(a);
        assert_eq!(node.pending_challenges(), 1);
        assert_eq!(node.stats().challenges_issued, 1);
        let pending = node.processor().authenticator().pending_for(&b).unwrap();
        assert_eq!(pending.claimed.counter, 2);
        assert_eq!(pending.claimed.rank, 400);

        mesh.inject(a, b, Channel::Auth, &response_for(1));
        let node = mesh.guard(a);
        assert_eq!(node.trust_record(2).last_accepted_counter, 2);
        assert_eq!(node.node_state().rank, 410);
    }

    // =========================================================================
    // TIMEOUT
    // =========================================================================

    #[test]
    fn test_silent_neighbour_is_distrusted_forever() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let root = mesh.add_guard(1);
        let node = mesh.add_guard(2);
        let silent = mesh.add_guard(3);
        mesh.link_chain(&[root, node, silent]);
        mesh.mute(silent, Channel::Auth);

        mesh.run_until(Timestamp::from_secs(30));

        let observer = mesh.guard(node);
        assert!(observer.trust_record(3).distrusted);
        assert_eq!(observer.stats().challenges_expired, 1);
        // One challenge to the root, one to the silent node, never another.
        assert_eq!(observer.stats().challenges_issued, 2);
        assert!(observer.stats().advertisements_distrusted >= 2);
        assert_eq!(observer.node_state().parent_id(), Some(1));
    }

    #[test]
    fn test_response_after_timeout_does_not_restore_trust() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let a = mesh.add_guard(3);
        let b = host_addr(2);

        mesh.inject(a, b, Channel::Advertisement, "2 1 500 1");
        mesh.advance(Duration::from_secs(10));
        mesh.inject(a, b, Channel::Auth, &response_for(1));
        mesh.inject(a, b, Channel::Advertisement, "2 1 500 2");

        let node = mesh.guard(a);
        assert!(node.trust_record(2).distrusted);
        assert!(node.node_state().parent.is_none());
        assert_eq!(node.stats().challenges_issued, 1);
    }
}
