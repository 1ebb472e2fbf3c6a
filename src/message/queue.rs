use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use crate::message::types::Event;
use crate::protocol::StackEvent;
use crate::{Error, Result};

/// Create a bounded FIFO event queue
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (sender, receiver) = mpsc::channel(capacity);

    let sender = EventSender {
        sender,
        dropped: Arc::new(AtomicU64::new(0)),
    };

    (sender, EventReceiver { receiver })
}

/// Producer side of the event queue.
///
/// Safe to call from any thread, including the radio stack's callback
/// context: `submit` never blocks or waits for the worker.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Enqueue an event, dropping it if the queue is saturated
    pub fn submit(&self, event: Event) -> Result<()> {
        match self.sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("Event queue full, dropping {} ({} dropped so far)", event.kind(), dropped);
                Err(Error::QueueFull)
            }
            Err(TrySendError::Closed(event)) => {
                debug!("Dispatcher gone, discarding {}", event.kind());
                Err(Error::Shutdown)
            }
        }
    }

    /// Entry point for radio stack callbacks
    pub fn stack_event(&self, event: StackEvent) -> Result<()> {
        self.submit(Event::Stack(event))
    }

    /// Number of events discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumer side, owned by the dispatch worker
pub struct EventReceiver {
    receiver: mpsc::Receiver<Event>,
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Stop accepting new events; already queued ones can still be drained
    pub fn close(&mut self) {
        self.receiver.close();
    }
}
