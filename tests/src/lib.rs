//! # RPL Replay Guard Test Suite
//!
//! Unified test crate for behaviour that spans several nodes.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # In-memory mesh: shared clock, radio links, delivery
//! ├── integration/      # Honest-node scenarios (trust, convergence, data)
//! └── exploits/         # Replay, impersonation and flooding attacks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rpl-tests
//!
//! # By category
//! cargo test -p rpl-tests integration::
//! cargo test -p rpl-tests exploits::
//! ```

pub mod exploits;
pub mod harness;
