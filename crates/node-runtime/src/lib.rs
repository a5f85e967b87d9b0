//! # Node Runtime
//!
//! Host event loop for guard and adversary nodes.
//!
//! The protocol core is synchronous and processes one event at a time. This
//! crate owns the I/O: it waits on the channel sockets, the node's next timer
//! deadline, an optional status ticker and a shutdown signal, and feeds every
//! wake-up to [`ProtocolEventHandler::handle_event`].
//!
//! ## Event Loop
//!
//! ```text
//!   advertisement socket ─┐
//!   auth socket ──────────┤
//!   data socket ──────────┼──→ tokio::select! ──→ NodeEvent ──→ handle_event()
//!   next_deadline() ──────┤
//!   shutdown ─────────────┘
//! ```

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::UdpSocket;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use rpl_guard::adapters::network::MAX_DATAGRAM_LEN;
use rpl_guard::{
    Channel, MonotonicTimeSource, NodeEvent, ProtocolEventHandler, UdpDatagramTransport,
};

/// Async receive handles for the channels a node listens on.
///
/// Channels the node does not listen on have no socket, and their branch of
/// the event loop never completes.
#[derive(Debug, Default)]
pub struct ChannelReceivers {
    advertisement: Option<UdpSocket>,
    auth: Option<UdpSocket>,
    data: Option<UdpSocket>,
}

impl ChannelReceivers {
    /// Register receive handles for `channels` with the tokio reactor.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if a socket cannot be duplicated or registered.
    pub fn open(transport: &UdpDatagramTransport, channels: &[Channel]) -> io::Result<Self> {
        let mut receivers = Self::default();
        for &channel in channels {
            let socket = UdpSocket::from_std(transport.try_clone_socket(channel)?)?;
            match channel {
                Channel::Advertisement => receivers.advertisement = Some(socket),
                Channel::Auth => receivers.auth = Some(socket),
                Channel::Data => receivers.data = Some(socket),
            }
        }
        Ok(receivers)
    }
}

/// Receive one datagram, or wait forever if there is no socket.
async fn recv_opt(socket: Option<&UdpSocket>) -> io::Result<(Vec<u8>, SocketAddr)> {
    match socket {
        Some(socket) => {
            let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
            let (n, from) = socket.recv_from(&mut buf).await?;
            buf.truncate(n);
            Ok((buf, from))
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn tick_opt(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn dispatch<H: ProtocolEventHandler>(
    node: &mut H,
    channel: Channel,
    received: io::Result<(Vec<u8>, SocketAddr)>,
) {
    match received {
        Ok((payload, from)) => {
            debug!(?channel, from = %from, len = payload.len(), "Datagram received");
            node.handle_event(NodeEvent::datagram(channel, from.ip(), payload));
        }
        // ICMP errors from earlier sends surface here on some platforms.
        Err(e) => warn!(?channel, error = %e, "Receive failed"),
    }
}

/// Drive `node` until `shutdown` completes.
///
/// `clock` must be the time source the node was built with, so that its
/// deadlines can be turned into wake-up instants. Every `status_interval`,
/// `report` is called with the node.
///
/// # Errors
///
/// Returns error only if the loop cannot be set up; receive and send errors
/// are logged and the loop keeps running.
pub async fn run_event_loop<H, F, R>(
    node: &mut H,
    receivers: ChannelReceivers,
    clock: MonotonicTimeSource,
    status_interval: Option<Duration>,
    mut report: R,
    shutdown: F,
) -> Result<()>
where
    H: ProtocolEventHandler,
    F: Future<Output = ()>,
    R: FnMut(&H),
{
    let mut status = match status_interval.filter(|d| !d.is_zero()) {
        Some(period) => {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(interval)
        }
        None => None,
    };

    tokio::pin!(shutdown);
    info!(channels = ?node.channels(), "Event loop running");

    loop {
        let deadline = node
            .next_deadline()
            .map(|t| Instant::from_std(clock.instant_at(t)));

        tokio::select! {
            received = recv_opt(receivers.advertisement.as_ref()) => {
                dispatch(node, Channel::Advertisement, received);
            }
            received = recv_opt(receivers.auth.as_ref()) => {
                dispatch(node, Channel::Auth, received);
            }
            received = recv_opt(receivers.data.as_ref()) => {
                dispatch(node, Channel::Data, received);
            }
            _ = sleep_until_opt(deadline) => {
                node.handle_event(NodeEvent::TimerExpired);
            }
            _ = tick_opt(status.as_mut()) => {
                report(&*node);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

/// Register receivers for the channels `node` listens on.
///
/// # Errors
///
/// Returns error if registration fails.
pub fn open_receivers<H: ProtocolEventHandler>(
    node: &H,
    transport: &UdpDatagramTransport,
) -> Result<ChannelReceivers> {
    ChannelReceivers::open(transport, node.channels())
        .context("registering channel sockets with the runtime")
}
