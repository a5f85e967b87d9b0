//! # Attack Simulations
//!
//! Adversaries without the shared key:
//!
//! - `replay`: capture one advertisement and re-broadcast it forever
//! - `impersonation`: claim another node's identity and guess the response
//! - `flooding`: exhaust the challenge pool with fake first contacts

pub mod flooding;
pub mod impersonation;
pub mod replay;
