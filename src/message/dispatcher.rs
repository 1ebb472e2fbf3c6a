use log::{debug, info, trace};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use crate::message::queue::EventReceiver;
use crate::message::types::Event;
use crate::{Error, Result};

/// Consumer of dispatched events.
///
/// `handle` runs to completion before the next event is taken from the
/// queue, so implementors own their state without any locking.
#[async_trait::async_trait]
pub trait EventHandler: Send {
    async fn handle(&mut self, event: Event);
}

/// Single worker task draining the event queue in FIFO order
pub struct EventDispatcher {
    /// Shutdown signal
    shutdown_tx: mpsc::Sender<()>,

    /// Worker task
    worker: JoinHandle<()>,
}

impl EventDispatcher {
    /// Move the handler onto a new worker task
    pub fn spawn<H>(handler: H, receiver: EventReceiver) -> Self
    where
        H: EventHandler + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let worker = tokio::spawn(run(handler, receiver, shutdown_rx));

        EventDispatcher { shutdown_tx, worker }
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Stop the worker and wait for it. The handler is dropped with it.
    pub async fn shutdown(self) -> Result<()> {
        // Worker may already be gone
        let _ = self.shutdown_tx.send(()).await;

        self.worker.await
            .map_err(|e| Error::worker(format!("dispatch worker failed: {}", e)))
    }
}

async fn run<H: EventHandler>(
    mut handler: H,
    mut receiver: EventReceiver,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    debug!("Dispatch worker started");

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                info!("Dispatch worker shutting down");
                receiver.close();
                break;
            }
            event = receiver.recv() => {
                match event {
                    Some(event) => {
                        trace!("Dispatching {}", event.kind());
                        handler.handle(event).await;
                    }
                    None => {
                        debug!("All event senders dropped");
                        break;
                    }
                }
            }
        }
    }
}
