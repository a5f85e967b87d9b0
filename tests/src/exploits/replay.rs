//! # Replay Attack
//!
//! The attacker records the first advertisement it overhears and
//! re-broadcasts the identical bytes 12 s later and every 10 s after that.
//!
//! Neighbours that already trust the victim drop the replay because its
//! counter is behind. A neighbour that only ever hears the victim through the
//! attacker challenges the attacker's address, gets no answer and distrusts
//! the victim's identity.

#[cfg(test)]
mod tests {
    use crate::harness::SimulatedMesh;
    use rpl_guard::{NodeStatusApi, ProtocolConfig, Timestamp};

    /// root(1) - victim(2) - observer(3), attacker in range of victim and observer.
    fn replay_mesh() -> (SimulatedMesh, usize, usize, usize, usize) {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let root = mesh.add_guard(1);
        let victim = mesh.add_guard(2);
        let observer = mesh.add_guard(3);
        let attacker = mesh.add_attacker(99);
        mesh.link_chain(&[root, victim, observer]);
        mesh.link(attacker, victim);
        mesh.link(attacker, observer);
        (mesh, root, victim, observer, attacker)
    }

    #[test]
    fn test_attacker_captures_first_advertisement() {
        let (mut mesh, _, victim, _, attacker) = replay_mesh();

        mesh.run_until(Timestamp::from_secs(2));

        let captured = mesh.attacker(attacker).engine().captured().unwrap();
        assert_eq!(captured.source, mesh.address(victim));
        assert_eq!(captured.raw_payload, b"2 1 1000000 1".to_vec());
        assert_eq!(captured.captured_at, Timestamp::from_secs(1));
    }

    #[test]
    fn test_replayed_advertisement_is_discarded_as_stale() {
        let (mut mesh, _, _, observer, attacker) = replay_mesh();

        mesh.run_until(Timestamp::from_secs(30));

        assert_eq!(mesh.attacker(attacker).engine().replays_sent(), 2);
        let observer = mesh.guard(observer);
        assert_eq!(observer.stats().advertisements_stale, 2);
        assert!(observer.trust_record(2).last_accepted_counter >= 5);
        assert!(!observer.trust_record(2).distrusted);
    }

    #[test]
    fn test_replay_does_not_disturb_topology() {
        let (mut mesh, root, victim, observer, _) = replay_mesh();

        mesh.run_until(Timestamp::from_secs(40));

        assert_eq!(mesh.guard(root).node_state().rank, 0);
        assert_eq!(mesh.guard(victim).node_state().parent_id(), Some(1));
        assert_eq!(mesh.guard(observer).node_state().parent_id(), Some(2));
        assert_eq!(mesh.guard(observer).node_state().rank, 20);
    }

    #[test]
    fn test_victim_ignores_its_own_replayed_advertisement() {
        let (mut mesh, _, victim, _, _) = replay_mesh();

        mesh.run_until(Timestamp::from_secs(30));

        let victim = mesh.guard(victim);
        assert_eq!(victim.stats().advertisements_stale, 0);
        assert_eq!(victim.stats().challenges_issued, 2);
        assert_eq!(victim.trust_record(2).last_accepted_counter, 0);
    }

    #[test]
    fn test_isolated_listener_distrusts_replayed_identity() {
        let (mut mesh, _, _, _, attacker) = replay_mesh();
        let isolated = mesh.add_guard(4);
        mesh.link(attacker, isolated);

        mesh.run_until(Timestamp::from_secs(30));

        let isolated = mesh.guard(isolated);
        assert!(isolated.trust_record(2).distrusted);
        assert_eq!(isolated.stats().challenges_expired, 1);
        assert_eq!(isolated.stats().advertisements_distrusted, 1);
        assert!(isolated.node_state().parent.is_none());
    }
}
