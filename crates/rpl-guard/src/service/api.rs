use crate::domain::{NodeId, NodeState, PeerTrustRecord};
use crate::ports::{DatagramTransport, NodeStats, NodeStatusApi};
use crate::service::GuardNode;

impl<T: DatagramTransport> NodeStatusApi for GuardNode<T> {
    fn node_state(&self) -> NodeState {
        let topology = self.processor.topology();
        NodeState {
            id: self.id(),
            is_root: topology.is_root(),
            version: self.config.protocol_version,
            rank: topology.rank(),
            own_counter: self.own_counter,
            parent: topology.parent(),
        }
    }

    fn stats(&self) -> NodeStats {
        let trust = self.processor.trust();
        NodeStats {
            trusted_peers: trust.trusted_count(),
            distrusted_peers: trust.distrusted_count(),
            ..self.stats
        }
    }

    fn trust_record(&self, sender_id: NodeId) -> PeerTrustRecord {
        self.processor.trust().lookup(sender_id)
    }

    fn pending_challenges(&self) -> usize {
        self.processor.authenticator().pool().len()
    }
}
