//! Domain Layer - Pure protocol logic with no I/O
//!
//! This module contains:
//! - Wire codec for advertisements, challenges and application data
//! - Peer trust store (freshness counters, permanent distrust)
//! - Challenge-response authenticator (bounded pending pool)
//! - Advertisement processor (replay detection)
//! - Topology selector (greedy rank/parent)
//! - Adversary replay engine

pub mod adversary;
pub mod authenticator;
pub mod codec;
pub mod entities;
pub mod errors;
pub mod processor;
pub mod topology;
pub mod trust_store;
pub mod value_objects;

pub use adversary::*;
pub use authenticator::*;
pub use codec::*;
pub use entities::*;
pub use errors::*;
pub use processor::*;
pub use topology::*;
pub use trust_store::*;
pub use value_objects::*;
