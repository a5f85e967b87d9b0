//! In-memory mesh for multi-node tests.
//!
//! All nodes share one [`ManualTimeSource`]. Datagrams are delivered
//! instantly and in send order, but only across configured links, which
//! stand in for radio range. Time only moves inside [`SimulatedMesh::run_until`],
//! jumping from one node deadline to the next.

use std::collections::{HashSet, VecDeque};
use std::net::{IpAddr, Ipv6Addr};
use std::time::Duration;

use rpl_guard::test_utils::{Destination, ManualTimeSource, RecordingTransport, SentDatagram};
use rpl_guard::{
    Channel, GuardNode, NodeEvent, NodeId, PeerAddr, ProtocolConfig, ProtocolEventHandler,
    ReplayNode, TimeSource, Timestamp,
};

/// Safety valve against schedules that never advance.
const MAX_STEPS: usize = 100_000;

/// Link-local address of host `host`.
pub fn host_addr(host: u16) -> PeerAddr {
    IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, host))
}

/// What runs at a mesh position.
pub enum Role {
    /// Honest node
    Guard(GuardNode<RecordingTransport>),
    /// Replay adversary
    Attacker(ReplayNode<RecordingTransport>),
}

impl Role {
    fn handler(&mut self) -> &mut dyn ProtocolEventHandler {
        match self {
            Self::Guard(node) => node,
            Self::Attacker(node) => node,
        }
    }

    fn next_deadline(&self) -> Option<Timestamp> {
        match self {
            Self::Guard(node) => node.next_deadline(),
            Self::Attacker(node) => node.next_deadline(),
        }
    }

    fn listens_on(&self, channel: Channel) -> bool {
        let channels = match self {
            Self::Guard(node) => node.channels(),
            Self::Attacker(node) => node.channels(),
        };
        channels.contains(&channel)
    }

    fn take_sent(&mut self) -> Vec<SentDatagram> {
        match self {
            Self::Guard(node) => node.transport_mut().take_sent(),
            Self::Attacker(node) => node.transport_mut().take_sent(),
        }
    }
}

struct MeshNode {
    address: PeerAddr,
    role: Role,
}

/// A set of nodes, the links between them and a shared clock.
pub struct SimulatedMesh {
    clock: ManualTimeSource,
    config: ProtocolConfig,
    nodes: Vec<MeshNode>,
    links: HashSet<(usize, usize)>,
    muted: HashSet<(usize, Channel)>,
    in_flight: VecDeque<(usize, SentDatagram)>,
    delivered: u64,
}

impl SimulatedMesh {
    /// Empty mesh at time zero.
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            clock: ManualTimeSource::new(0),
            config,
            nodes: Vec::new(),
            links: HashSet::new(),
            muted: HashSet::new(),
            in_flight: VecDeque::new(),
            delivered: 0,
        }
    }

    /// Current mesh time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Add a guard node with identifier `id` at host address `id`.
    pub fn add_guard(&mut self, id: NodeId) -> usize {
        let node = GuardNode::with_seed(
            id,
            self.config.clone(),
            RecordingTransport::new(),
            Box::new(self.clock.clone()),
            u64::from(id),
        );
        self.push(host_addr(id as u16), Role::Guard(node))
    }

    /// Add a replay adversary at host address `host`.
    pub fn add_attacker(&mut self, host: u16) -> usize {
        let node = ReplayNode::new(
            &self.config,
            RecordingTransport::new(),
            Box::new(self.clock.clone()),
        );
        self.push(host_addr(host), Role::Attacker(node))
    }

    fn push(&mut self, address: PeerAddr, role: Role) -> usize {
        self.nodes.push(MeshNode { address, role });
        self.nodes.len() - 1
    }

    /// Put `a` and `b` in radio range of each other.
    pub fn link(&mut self, a: usize, b: usize) {
        self.links.insert((a.min(b), a.max(b)));
    }

    /// Link consecutive nodes in `chain`.
    pub fn link_chain(&mut self, chain: &[usize]) {
        for pair in chain.windows(2) {
            self.link(pair[0], pair[1]);
        }
    }

    fn linked(&self, a: usize, b: usize) -> bool {
        self.links.contains(&(a.min(b), a.max(b)))
    }

    /// Drop everything node `index` sends on `channel`.
    pub fn mute(&mut self, index: usize, channel: Channel) {
        self.muted.insert((index, channel));
    }

    /// Address of node `index`.
    pub fn address(&self, index: usize) -> PeerAddr {
        self.nodes[index].address
    }

    /// Guard node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the node is an attacker.
    pub fn guard(&self, index: usize) -> &GuardNode<RecordingTransport> {
        match &self.nodes[index].role {
            Role::Guard(node) => node,
            Role::Attacker(_) => panic!("node {index} is an attacker"),
        }
    }

    /// Attacker at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the node is a guard.
    pub fn attacker(&self, index: usize) -> &ReplayNode<RecordingTransport> {
        match &self.nodes[index].role {
            Role::Attacker(node) => node,
            Role::Guard(_) => panic!("node {index} is a guard"),
        }
    }

    /// Datagrams delivered so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Hand node `to` a datagram from an address outside the mesh, then
    /// deliver whatever it causes.
    pub fn inject(&mut self, to: usize, from: PeerAddr, channel: Channel, payload: &str) {
        self.dispatch(to, NodeEvent::datagram(channel, from, payload));
        self.flush();
    }

    /// Advance time by `by`, running every deadline on the way.
    pub fn advance(&mut self, by: Duration) {
        let end = self.now().add(by);
        self.run_until(end);
    }

    /// Run every node deadline up to and including `end`.
    pub fn run_until(&mut self, end: Timestamp) {
        for _ in 0..MAX_STEPS {
            self.flush();

            let next = self
                .nodes
                .iter()
                .filter_map(|n| n.role.next_deadline())
                .min();
            let Some(next) = next.filter(|t| *t <= end) else {
                if end > self.now() {
                    self.clock.set(end);
                }
                return;
            };

            if next > self.now() {
                self.clock.set(next);
            }
            let now = self.now();
            for index in 0..self.nodes.len() {
                let due = self.nodes[index]
                    .role
                    .next_deadline()
                    .is_some_and(|t| now.has_reached(t));
                if due {
                    self.dispatch(index, NodeEvent::TimerExpired);
                    self.flush();
                }
            }
        }
        panic!("mesh did not reach {end} within {MAX_STEPS} steps");
    }

    fn dispatch(&mut self, index: usize, event: NodeEvent) {
        let role = &mut self.nodes[index].role;
        role.handler().handle_event(event);
        for datagram in role.take_sent() {
            self.in_flight.push_back((index, datagram));
        }
    }

    fn flush(&mut self) {
        while let Some((from, datagram)) = self.in_flight.pop_front() {
            if self.muted.contains(&(from, datagram.channel)) {
                continue;
            }
            let source = self.nodes[from].address;
            let receivers: Vec<usize> = (0..self.nodes.len())
                .filter(|&to| to != from && self.linked(from, to))
                .filter(|&to| self.nodes[to].role.listens_on(datagram.channel))
                .filter(|&to| match datagram.destination {
                    Destination::Multicast => true,
                    Destination::Unicast(addr) => self.nodes[to].address == addr,
                })
                .collect();

            for to in receivers {
                self.delivered += 1;
                let event = NodeEvent::datagram(datagram.channel, source, datagram.payload.clone());
                self.dispatch(to, event);
            }
        }
    }
}
