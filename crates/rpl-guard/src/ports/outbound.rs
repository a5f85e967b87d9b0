//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces this crate **requires** the host to implement.

use thiserror::Error;

use crate::domain::{Channel, NodeId, PeerAddr, ProtocolConfig, Timestamp};

/// Abstract datagram transport.
///
/// The host must provide a concrete implementation (e.g. UDP sockets bound to
/// the three channel ports). Sends are fire-and-forget; delivery is not
/// guaranteed.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct LoggingTransport;
///
/// impl DatagramTransport for LoggingTransport {
///     fn multicast(&mut self, channel: Channel, payload: &[u8]) -> Result<(), TransportError> {
///         println!("{channel:?} -> all: {}", String::from_utf8_lossy(payload));
///         Ok(())
///     }
///     // ...
/// }
/// ```
pub trait DatagramTransport: Send {
    /// Send `payload` to every link-local neighbour on `channel`.
    fn multicast(&mut self, channel: Channel, payload: &[u8]) -> Result<(), TransportError>;

    /// Send `payload` to `to` on `channel`.
    fn unicast(
        &mut self,
        to: PeerAddr,
        channel: Channel,
        payload: &[u8],
    ) -> Result<(), TransportError>;
}

/// Errors from transport operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Socket buffer full; datagram dropped
    #[error("send would block, datagram dropped")]
    WouldBlock,
    /// Destination cannot be reached from this socket
    #[error("invalid destination {0}")]
    InvalidAddress(String),
    /// Payload exceeds what the transport accepts
    #[error("payload of {size} bytes exceeds maximum {max}")]
    MessageTooLarge {
        /// Offending size
        size: usize,
        /// Transport limit
        max: usize,
    },
    /// Any other I/O failure
    #[error("transport I/O error: {0}")]
    Io(String),
}

/// Abstract interface for time.
///
/// Enables deterministic testing by injecting controllable clocks.
pub trait TimeSource: Send + Sync {
    /// Current time on the node's monotonic clock.
    fn now(&self) -> Timestamp;
}

/// Abstract interface for configuration loading.
pub trait ConfigProvider: Send + Sync {
    /// Configured node id (0 means "derive from address").
    fn get_node_id(&self) -> NodeId;

    /// Protocol parameters.
    fn get_protocol_config(&self) -> ProtocolConfig;
}
