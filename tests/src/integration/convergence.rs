//! # Tree Convergence
//!
//! Several honest nodes in a line form a tree rooted at node 1 and carry
//! application traffic up to it.

#[cfg(test)]
mod tests {
    use crate::harness::SimulatedMesh;
    use rpl_guard::{NodeStatusApi, ProtocolConfig, Timestamp};

    fn line_of_four() -> (SimulatedMesh, Vec<usize>) {
        let mut mesh = SimulatedMesh::new(ProtocolConfig::for_testing());
        let nodes: Vec<usize> = (1..=4).map(|id| mesh.add_guard(id)).collect();
        mesh.link_chain(&nodes);
        (mesh, nodes)
    }

    #[test]
    fn test_line_converges_to_hop_count_ranks() {
        let (mut mesh, nodes) = line_of_four();

        mesh.run_until(Timestamp::from_secs(30));

        let ranks: Vec<u32> = nodes
            .iter()
            .map(|&n| mesh.guard(n).node_state().rank)
            .collect();
        assert_eq!(ranks, vec![0, 10, 20, 30]);

        let parents: Vec<Option<u32>> = nodes
            .iter()
            .map(|&n| mesh.guard(n).node_state().parent_id())
            .collect();
        assert_eq!(parents, vec![None, Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_every_node_trusts_its_neighbours() {
        let (mut mesh, nodes) = line_of_four();

        mesh.run_until(Timestamp::from_secs(30));

        for pair in nodes.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let left_id = mesh.guard(left).node_state().id;
            let right_id = mesh.guard(right).node_state().id;
            assert!(mesh.guard(left).trust_record(right_id).last_accepted_counter > 0);
            assert!(mesh.guard(right).trust_record(left_id).last_accepted_counter > 0);
        }
        for &n in &nodes {
            assert_eq!(mesh.guard(n).stats().distrusted_peers, 0);
            assert_eq!(mesh.guard(n).stats().advertisements_stale, 0);
        }
    }

    #[test]
    fn test_counters_keep_advancing() {
        let (mut mesh, nodes) = line_of_four();

        mesh.run_until(Timestamp::from_secs(30));

        // Advertisements at 1 s, then every 5 s.
        for &n in &nodes {
            assert_eq!(mesh.guard(n).node_state().own_counter, 6);
        }
        let root_seen_by_child = mesh.guard(nodes[1]).trust_record(1);
        assert_eq!(root_seen_by_child.last_accepted_counter, 6);
    }

    #[test]
    fn test_application_data_reaches_root() {
        let (mut mesh, nodes) = line_of_four();

        // First round at 5 s: only node 2 has a parent yet. Second round at 15 s.
        mesh.run_until(Timestamp::from_secs(16));

        assert_eq!(mesh.guard(nodes[0]).stats().data_delivered, 4);
        let forwarded: Vec<u64> = nodes[1..]
            .iter()
            .map(|&n| mesh.guard(n).stats().data_forwarded)
            .collect();
        assert_eq!(forwarded, vec![2, 1, 0]);
        let originated: Vec<u64> = nodes[1..]
            .iter()
            .map(|&n| mesh.guard(n).stats().data_originated)
            .collect();
        assert_eq!(originated, vec![2, 1, 1]);
    }
}
