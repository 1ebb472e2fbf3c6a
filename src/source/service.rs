use std::sync::Arc;
use log::info;
use tokio::sync::oneshot;
use crate::connection::{ConnectionStateMachine, StatusSnapshot};
use crate::message::{event_queue, Event, EventDispatcher, EventSender};
use crate::protocol::{AudioProducer, RadioStack, StackEvent};
use crate::source::config::SourceConfig;
use crate::utils::{Clock, MonotonicClock};
use crate::{Error, Result};

/// Running A2DP source: the dispatch worker and the connection state it owns
pub struct A2dpSource {
    /// Source configuration
    config: Arc<SourceConfig>,

    /// Queue into the worker
    events: EventSender,

    dispatcher: EventDispatcher,
}

impl A2dpSource {
    /// Validate the config, spawn the worker and announce stack-up
    pub async fn start(
        config: SourceConfig,
        stack: Arc<dyn RadioStack>,
        producer: Arc<dyn AudioProducer>,
    ) -> Result<Self> {
        Self::start_with_clock(config, stack, producer, Arc::new(MonotonicClock::new())).await
    }

    pub async fn start_with_clock(
        config: SourceConfig,
        stack: Arc<dyn RadioStack>,
        producer: Arc<dyn AudioProducer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let (events, receiver) = event_queue(config.queue_capacity);
        let machine = ConnectionStateMachine::new(
            config.clone(),
            stack,
            producer,
            clock,
            events.clone(),
        );
        let dispatcher = EventDispatcher::spawn(machine, receiver);

        info!("A2DP source started, looking for {}", config.sink_name);
        events.stack_event(StackEvent::StackUp)?;

        Ok(A2dpSource {
            config,
            events,
            dispatcher,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Sender for stack glue code to report events on
    pub fn events(&self) -> EventSender {
        self.events.clone()
    }

    /// Current state, read on the worker after everything queued before it
    pub async fn status(&self) -> Result<StatusSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.events.submit(Event::Query(tx))?;
        rx.await.map_err(|_| Error::Shutdown)
    }

    /// Ask to release the connected sink
    pub fn disconnect(&self) -> Result<()> {
        self.events.submit(Event::DisconnectRequest)
    }

    pub fn is_running(&self) -> bool {
        !self.dispatcher.is_finished()
    }

    /// Stop the worker. The heartbeat stops with it.
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down A2DP source");
        self.dispatcher.shutdown().await
    }
}
