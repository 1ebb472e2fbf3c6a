use std::fmt;
use tokio::sync::oneshot;
use crate::connection::StatusSnapshot;
use crate::protocol::StackEvent;

/// Unit of work for the dispatch worker
#[derive(Debug)]
pub enum Event {
    /// Forwarded from the radio stack callback
    Stack(StackEvent),

    /// Synthetic tick from the heartbeat scheduler
    Heartbeat,

    /// Ask the connected sink to be released
    DisconnectRequest,

    /// Diagnostic read, answered from the worker
    Query(oneshot::Sender<StatusSnapshot>),
}

/// Payload-free tag of an [`Event`], for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Stack(&'static str),
    Heartbeat,
    DisconnectRequest,
    Query,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Stack(event) => EventKind::Stack(event.name()),
            Event::Heartbeat => EventKind::Heartbeat,
            Event::DisconnectRequest => EventKind::DisconnectRequest,
            Event::Query(_) => EventKind::Query,
        }
    }

    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Event::Heartbeat)
    }
}

impl From<StackEvent> for Event {
    fn from(event: StackEvent) -> Self {
        Event::Stack(event)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Stack(name) => f.write_str(name),
            EventKind::Heartbeat => f.write_str("heartbeat"),
            EventKind::DisconnectRequest => f.write_str("disconnect-request"),
            EventKind::Query => f.write_str("query"),
        }
    }
}
