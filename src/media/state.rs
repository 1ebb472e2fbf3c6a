use std::fmt;

/// Transport sub-state, only meaningful while the sink is connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaState {
    /// Transport down, polling the producer
    #[default]
    Idle,

    /// Start requested, waiting for the ack
    Starting,

    /// Streaming
    Started,

    /// Stop requested, waiting for the ack
    Stopping,

    /// Transport to be torn down together with the link
    WaitDisconnect,
}

impl MediaState {
    pub fn is_streaming(&self) -> bool {
        *self == MediaState::Started
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaState::Idle => "IDLE",
            MediaState::Starting => "STARTING",
            MediaState::Started => "STARTED",
            MediaState::Stopping => "STOPPING",
            MediaState::WaitDisconnect => "WAIT_DISCONNECT",
        }
    }
}

impl fmt::Display for MediaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
