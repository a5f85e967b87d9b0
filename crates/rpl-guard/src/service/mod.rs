//! # Guard Node Service
//!
//! Wires the domain processor to the transport, clock and random ports.
//!
//! [`GuardNode`] is the honest participant: it dispatches datagrams from the
//! three channels, answers and issues challenges, emits periodic
//! advertisements and forwards application traffic toward the root.
//! [`ReplayNode`] is the adversary: it captures one advertisement and replays
//! it forever.
//!
//! Both implement [`ProtocolEventHandler`](crate::ports::ProtocolEventHandler)
//! so the same host event loop can drive either role.

mod api;
mod core;
mod events;
mod maintenance;
mod replay;

pub use core::GuardNode;
pub use replay::ReplayNode;
