//! # RPL Node
//!
//! Runs one mesh node on three UDP channel ports.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging (`RUST_LOG`, default `info`)
//! 2. Load configuration (TOML file if given, built-in defaults otherwise)
//! 3. Apply command-line overrides
//! 4. Bind channel sockets and join the advertisement group
//! 5. Run the guard node (or, with feature `attacker`, the replay adversary)
//!    until Ctrl+C

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::{open_receivers, run_event_loop};
use rpl_guard::{
    ConfigProvider, MonotonicTimeSource, NodeId, ProtocolConfig, StaticConfigProvider,
    TomlConfigProvider, TransportSettings, UdpDatagramTransport,
};

/// Replay-guarded mesh routing node
#[derive(Parser, Debug)]
#[command(name = "rpl-node")]
#[command(about = "Mesh routing node with challenge-response replay protection")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "RPL_CONFIG")]
    config: Option<PathBuf>,

    /// Node id (0 derives it from the bind address)
    #[arg(short, long, env = "RPL_NODE_ID")]
    node_id: Option<NodeId>,

    /// Local address to bind the channel sockets to
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Advertisement destination (multicast group or single address)
    #[arg(long)]
    group: Option<IpAddr>,

    /// Interface index for the multicast join and link-local scope
    #[arg(long)]
    interface: Option<u32>,

    /// Seconds between status log lines (0 disables)
    #[arg(long, default_value = "30")]
    stats_interval: u64,
}

/// Resolved startup configuration.
struct Startup {
    node_id: NodeId,
    config: ProtocolConfig,
    settings: TransportSettings,
}

fn load_config(args: &Args) -> Result<Startup> {
    let (node_id, config, mut settings) = match &args.config {
        Some(path) => {
            let provider = TomlConfigProvider::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            info!(path = %path.display(), "Loaded configuration file");
            (
                provider.get_node_id(),
                provider.get_protocol_config(),
                provider.transport_settings(),
            )
        }
        None => {
            let provider = StaticConfigProvider::new();
            let config = provider.get_protocol_config();
            let settings = TransportSettings::new(config.ports);
            (provider.get_node_id(), config, settings)
        }
    };

    if let Some(bind) = args.bind {
        settings.bind = bind;
    }
    if let Some(group) = args.group {
        settings.group = group;
    }
    if let Some(interface) = args.interface {
        settings.interface = interface;
    }

    Ok(Startup {
        node_id: args.node_id.unwrap_or(node_id),
        config,
        settings,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let startup = load_config(&args)?;
    let transport = UdpDatagramTransport::bind(startup.settings)
        .context("binding channel sockets")?;
    let clock = MonotonicTimeSource::new();
    let status_interval = Some(Duration::from_secs(args.stats_interval));

    info!("Node is running. Press Ctrl+C to stop.");
    let shutdown = async {
        // Failure to install the handler leaves the node running until killed.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    run_role(startup, transport, clock, status_interval, shutdown).await
}

#[cfg(not(feature = "attacker"))]
async fn run_role(
    startup: Startup,
    transport: UdpDatagramTransport,
    clock: MonotonicTimeSource,
    status_interval: Option<Duration>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    use rpl_guard::{derive_node_id, GuardNode, NodeStatusApi};

    let id = derive_node_id(startup.node_id, Some(startup.settings.bind));
    let mut node = GuardNode::new(id, startup.config, transport.clone(), Box::new(clock));
    let receivers = open_receivers(&node, &transport)?;

    run_event_loop(
        &mut node,
        receivers,
        clock,
        status_interval,
        |node| {
            let state = node.node_state();
            let stats = node.stats();
            info!(
                rank = state.rank,
                parent = ?state.parent_id(),
                counter = state.own_counter,
                trusted = stats.trusted_peers,
                distrusted = stats.distrusted_peers,
                pending = node.pending_challenges(),
                accepted = stats.advertisements_accepted,
                stale = stats.advertisements_stale,
                "STATUS"
            );
        },
        shutdown,
    )
    .await
}

#[cfg(feature = "attacker")]
async fn run_role(
    startup: Startup,
    transport: UdpDatagramTransport,
    clock: MonotonicTimeSource,
    status_interval: Option<Duration>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    use rpl_guard::ReplayNode;

    info!("Starting replay attacker");
    let mut node = ReplayNode::new(&startup.config, transport.clone(), Box::new(clock));
    let receivers = open_receivers(&node, &transport)?;

    run_event_loop(
        &mut node,
        receivers,
        clock,
        status_interval,
        |node| {
            info!(
                captured = node.engine().has_captured(),
                replays = node.engine().replays_sent(),
                "STATUS"
            );
        },
        shutdown,
    )
    .await
}
