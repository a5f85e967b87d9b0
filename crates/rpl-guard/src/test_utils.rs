//! Test utilities for guard nodes.
//!
//! Mock implementations of the outbound ports for deterministic testing.
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use rpl_guard::test_utils::ManualTimeSource;
//! use rpl_guard::TimeSource;
//!
//! let clock = ManualTimeSource::new(0);
//! let handle = clock.clone();
//! handle.advance(Duration::from_secs(3));
//! assert_eq!(clock.now().as_millis(), 3000);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Channel, PeerAddr, Timestamp};
use crate::ports::{DatagramTransport, TimeSource, TransportError};

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep a handle while
/// the node owns a boxed copy.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    millis: Arc<AtomicU64>,
}

impl ManualTimeSource {
    /// Create a clock reading `millis`.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Set the clock to `at`.
    pub fn set(&self, at: Timestamp) {
        self.millis.store(at.as_millis(), Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Where a recorded datagram was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// All link-local neighbours
    Multicast,
    /// A single peer
    Unicast(PeerAddr),
}

/// One datagram handed to a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDatagram {
    /// Destination
    pub destination: Destination,
    /// Channel
    pub channel: Channel,
    /// Raw bytes
    pub payload: Vec<u8>,
}

impl SentDatagram {
    /// Payload as text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// A transport that records every send instead of performing I/O.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Vec<SentDatagram>,
    fail_with: Option<TransportError>,
}

impl RecordingTransport {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with `error` (nothing is recorded).
    pub fn fail_with(&mut self, error: TransportError) {
        self.fail_with = Some(error);
    }

    /// Datagrams sent so far.
    pub fn sent(&self) -> &[SentDatagram] {
        &self.sent
    }

    /// Drain the recorded datagrams.
    pub fn take_sent(&mut self) -> Vec<SentDatagram> {
        std::mem::take(&mut self.sent)
    }

    fn record(
        &mut self,
        destination: Destination,
        channel: Channel,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.sent.push(SentDatagram {
            destination,
            channel,
            payload: payload.to_vec(),
        });
        Ok(())
    }
}

impl DatagramTransport for RecordingTransport {
    fn multicast(&mut self, channel: Channel, payload: &[u8]) -> Result<(), TransportError> {
        self.record(Destination::Multicast, channel, payload)
    }

    fn unicast(
        &mut self,
        to: PeerAddr,
        channel: Channel,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        self.record(Destination::Unicast(to), channel, payload)
    }
}
