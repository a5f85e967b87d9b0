use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::{AdvertisementProcessor, Counter, NodeId, ProtocolConfig, Timestamp};
use crate::ports::{DatagramTransport, NodeStats, TimeSource};

/// An honest protocol participant.
///
/// Owns the replay-detecting processor plus everything needed to talk to the
/// outside world. All state changes happen inside
/// [`handle_event`](crate::ports::ProtocolEventHandler::handle_event), one
/// event at a time.
///
/// # Example
///
/// ```rust,ignore
/// use rpl_guard::{GuardNode, ProtocolConfig};
///
/// let transport = UdpDatagramTransport::bind(&settings)?;
/// let mut node = GuardNode::new(2, ProtocolConfig::default(), transport, Box::new(MonotonicTimeSource::new()));
///
/// loop {
///     let event = next_event(node.next_deadline()).await;
///     node.handle_event(event);
/// }
/// ```
pub struct GuardNode<T: DatagramTransport> {
    pub(crate) config: ProtocolConfig,
    pub(crate) own_counter: Counter,
    pub(crate) processor: AdvertisementProcessor,
    pub(crate) transport: T,
    pub(crate) time_source: Box<dyn TimeSource>,
    pub(crate) rng: StdRng,
    pub(crate) next_advert_at: Timestamp,
    pub(crate) next_app_at: Option<Timestamp>,
    pub(crate) stats: NodeStats,
}

impl<T: DatagramTransport> GuardNode<T> {
    /// Create a node with identifier `id`.
    ///
    /// The node is the root iff `id == config.root_id`. The first
    /// advertisement is scheduled `first_advert_delay` plus jitter from now.
    pub fn new(
        id: NodeId,
        config: ProtocolConfig,
        transport: T,
        time_source: Box<dyn TimeSource>,
    ) -> Self {
        Self::with_rng(id, config, transport, time_source, StdRng::from_entropy())
    }

    /// Create a node whose jitter is drawn from a seeded generator.
    pub fn with_seed(
        id: NodeId,
        config: ProtocolConfig,
        transport: T,
        time_source: Box<dyn TimeSource>,
        seed: u64,
    ) -> Self {
        Self::with_rng(id, config, transport, time_source, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        id: NodeId,
        config: ProtocolConfig,
        transport: T,
        time_source: Box<dyn TimeSource>,
        rng: StdRng,
    ) -> Self {
        let now = time_source.now();
        let processor = AdvertisementProcessor::new(id, &config);
        let next_app_at = (config.app_traffic && !processor.topology().is_root())
            .then(|| now.add(config.app_initial_delay));

        let mut node = Self {
            config,
            own_counter: 0,
            processor,
            transport,
            time_source,
            rng,
            next_advert_at: now,
            next_app_at,
            stats: NodeStats::default(),
        };
        node.next_advert_at = now
            .add(node.config.first_advert_delay)
            .add(node.draw_jitter());

        tracing::info!(
            id,
            root = node.processor.topology().is_root(),
            rank = node.processor.topology().rank(),
            "Guard node started"
        );
        node
    }

    /// Get the current timestamp from the time source.
    pub(crate) fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    /// Our node id.
    pub fn id(&self) -> NodeId {
        self.processor.self_id()
    }

    /// Protocol parameters in use.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// The replay-detecting processor (for inspection).
    pub fn processor(&self) -> &AdvertisementProcessor {
        &self.processor
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
