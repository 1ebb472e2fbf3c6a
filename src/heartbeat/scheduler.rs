use std::time::Duration;
use log::{debug, trace, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use crate::message::{Event, EventSender};
use crate::protocol::MAX_HEARTBEAT_MS;
use crate::Error;

/// Periodic heartbeat feeding the event queue.
///
/// The task only submits [`Event::Heartbeat`]; all decisions happen on the
/// dispatch worker. It stops on its own once the queue is closed and is
/// aborted when dropped.
pub struct Heartbeat {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Periods beyond [`MAX_HEARTBEAT_MS`] are clamped so the first
    /// deadline stays representable.
    pub fn new(period: Duration) -> Self {
        let max = Duration::from_millis(MAX_HEARTBEAT_MS);
        if period > max {
            warn!("Heartbeat period {:?} clamped to {:?}", period, max);
        }

        Heartbeat {
            period: period.min(max),
            handle: None,
        }
    }

    /// Start ticking. A second call while running is a no-op.
    pub fn start(&mut self, events: EventSender) {
        if self.is_running() {
            return;
        }

        let period = self.period;
        debug!("Starting heartbeat every {:?}", period);

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                trace!("Heartbeat");

                match events.submit(Event::Heartbeat) {
                    Ok(()) => {}
                    // Dropped tick, the next one re-probes
                    Err(Error::QueueFull) => {}
                    Err(_) => {
                        debug!("Event queue closed, heartbeat exiting");
                        break;
                    }
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Stopping heartbeat");
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.stop();
    }
}
