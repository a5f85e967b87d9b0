use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::domain::{Advertisement, Channel, DataMessage, Timestamp, WirePayload, ROOT_DESTINATION};
use crate::ports::DatagramTransport;
use crate::service::GuardNode;

/// Token carried by locally originated application datagrams.
pub(crate) const APP_TOKEN: &str = "hello-rpl";

impl<T: DatagramTransport> GuardNode<T> {
    /// Random delay in `[0, advert_jitter)`.
    pub(crate) fn draw_jitter(&mut self) -> Duration {
        let bound = self.config.advert_jitter.as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..bound))
    }

    /// Expire overdue challenges, distrusting their claimed senders.
    ///
    /// Runs before every event so no response can be accepted past its
    /// deadline.
    pub(crate) fn expire_challenges(&mut self, now: Timestamp) {
        let expired = self.processor.expire_challenges(now);
        self.stats.challenges_expired += expired.len() as u64;
    }

    /// Run whichever periodic jobs are due at `now`.
    pub(crate) fn run_due_jobs(&mut self, now: Timestamp) {
        if now.has_reached(self.next_advert_at) {
            self.send_advertisement(now);
        }
        if let Some(due) = self.next_app_at {
            if now.has_reached(due) {
                self.send_app_data(now);
            }
        }
    }

    /// Multicast a fresh advertisement and schedule the next one.
    ///
    /// The counter is incremented before sending, so the first advertisement
    /// carries counter 1.
    pub(crate) fn send_advertisement(&mut self, now: Timestamp) {
        self.own_counter = self.own_counter.wrapping_add(1);
        let adv = Advertisement::new(
            self.id(),
            self.config.protocol_version,
            self.processor.topology().rank(),
            self.own_counter,
        );

        match self.transport.multicast(Channel::Advertisement, &adv.encode()) {
            Ok(()) => {
                self.stats.advertisements_sent += 1;
                debug!(counter = adv.counter, rank = adv.rank, "Sent advertisement");
            }
            Err(e) => warn!(error = %e, counter = adv.counter, "Failed to send advertisement"),
        }

        let jitter = self.draw_jitter();
        self.next_advert_at = now.add(self.config.advert_interval).add(jitter);
    }

    /// Send one application datagram to our parent and reschedule.
    ///
    /// Skipped (but still rescheduled) while no parent is known.
    pub(crate) fn send_app_data(&mut self, now: Timestamp) {
        self.next_app_at = Some(now.add(self.config.app_interval));

        let Some(parent) = self.processor.topology().parent() else {
            info!("Root not reachable, no parent yet");
            return;
        };

        let message = DataMessage::new(self.id(), ROOT_DESTINATION, APP_TOKEN);
        match self
            .transport
            .unicast(parent.address, Channel::Data, &message.encode())
        {
            Ok(()) => {
                self.stats.data_originated += 1;
                info!(parent = parent.id, "DATA sent toward root");
            }
            Err(e) => warn!(error = %e, parent = parent.id, "Failed to send application datagram"),
        }
    }

    /// Earliest instant at which a timer event is needed.
    pub(crate) fn earliest_deadline(&self) -> Timestamp {
        [self.next_app_at, self.processor.next_deadline()]
            .into_iter()
            .flatten()
            .fold(self.next_advert_at, |earliest, t| earliest.min(t))
    }
}
