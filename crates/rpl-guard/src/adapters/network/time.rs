use std::time::{Duration, Instant};

use crate::domain::Timestamp;
use crate::ports::TimeSource;

/// Monotonic time source counting milliseconds from its creation.
///
/// Wall-clock jumps never affect challenge deadlines or emission schedules.
///
/// # Example
///
/// ```rust
/// use rpl_guard::adapters::network::MonotonicTimeSource;
/// use rpl_guard::ports::TimeSource;
///
/// let clock = MonotonicTimeSource::new();
/// let t1 = clock.now();
/// assert!(clock.now() >= t1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTimeSource {
    origin: Instant,
}

impl MonotonicTimeSource {
    /// Create a clock reading zero now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant a timestamp from this clock refers to.
    pub fn instant_at(&self, timestamp: Timestamp) -> Instant {
        self.origin + Duration::from_millis(timestamp.as_millis())
    }
}

impl Default for MonotonicTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.origin.elapsed().as_millis() as u64)
    }
}
