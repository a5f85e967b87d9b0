//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the event interface and status API this
//!   crate exposes to the host runtime
//! - **Driven Ports (Outbound):** transport, clock and configuration SPIs the
//!   host must provide

pub mod inbound;
pub mod outbound;

pub use inbound::{NodeEvent, NodeStats, NodeStatusApi, ProtocolEventHandler};
pub use outbound::{ConfigProvider, DatagramTransport, TimeSource, TransportError};
