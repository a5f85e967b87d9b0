//! # Challenge Pool Flooding
//!
//! Fake first-contact advertisements occupy pending-challenge slots until
//! they time out. While the pool is full, genuine first contacts are dropped
//! without a challenge, which delays trust but never blocks it for good.

#[cfg(test)]
mod tests {
    use crate::harness::{host_addr, SimulatedMesh};
    use rpl_guard::{Channel, NodeStatusApi, ProtocolConfig, Timestamp};

    #[test]
    fn test_full_pool_delays_a_genuine_neighbour() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let root = mesh.add_guard(1);
        let node = mesh.add_guard(2);
        mesh.link(root, node);

        for id in 40..45u16 {
            let payload = format!("{id} 1 0 1");
            mesh.inject(node, host_addr(id), Channel::Advertisement, &payload);
        }
        assert_eq!(mesh.guard(node).pending_challenges(), 2);
        assert_eq!(mesh.guard(node).stats().pool_exhausted, 3);

        // Root advertisements at 1 s and 6 s find the pool full.
        mesh.run_until(Timestamp::from_secs(9));
        let guard = mesh.guard(node);
        assert!(guard.node_state().parent.is_none());
        assert_eq!(guard.stats().pool_exhausted, 5);

        // Fake claims expire at 10 s; the root's 11 s advertisement gets through.
        mesh.run_until(Timestamp::from_secs(12));
        let guard = mesh.guard(node);
        assert_eq!(guard.node_state().parent_id(), Some(1));
        assert_eq!(guard.stats().challenges_expired, 2);
        assert!(guard.trust_record(40).distrusted);
        assert!(guard.trust_record(41).distrusted);
        assert!(guard.trust_record(42).is_first_contact());
        assert!(!guard.trust_record(42).distrusted);
    }

    #[test]
    fn test_flood_from_one_address_holds_one_slot() {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let node = mesh.add_guard(2);
        let attacker = host_addr(77);

        for id in 20..30u32 {
            let payload = format!("{id} 1 0 1");
            mesh.inject(node, attacker, Channel::Advertisement, &payload);
        }

        let guard = mesh.guard(node);
        assert_eq!(guard.pending_challenges(), 1);
        assert_eq!(guard.stats().challenges_issued, 1);
        assert_eq!(guard.stats().pool_exhausted, 0);
        let pending = guard.processor().authenticator().pending_for(&attacker).unwrap();
        assert_eq!(pending.claimed.sender_id, 29);

        mesh.run_until(Timestamp::from_secs(10));
        let guard = mesh.guard(node);
        assert!(guard.trust_record(29).distrusted);
        assert!(!guard.trust_record(20).distrusted);
        assert_eq!(guard.stats().distrusted_peers, 1);
    }
}
