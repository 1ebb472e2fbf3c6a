use std::fmt;

/// Top-level lifecycle of the link to the target sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Waiting for the radio stack to come up
    #[default]
    Idle,

    /// Inquiry running, looking for the sink
    Discovering,

    /// Sink found, waiting for the inquiry to stop
    Discovered,

    /// Sink known, no link
    Unconnected,

    /// Connect issued, deadline armed
    Connecting,

    /// Link up, media sub-machine active
    Connected,

    /// Disconnect issued, waiting for the link to drop
    Disconnecting,
}

impl ConnectionState {
    /// Check if the target address is meaningful in this state
    pub fn has_peer(&self) -> bool {
        !matches!(self, ConnectionState::Idle | ConnectionState::Discovering)
    }

    pub fn is_connected(&self) -> bool {
        *self == ConnectionState::Connected
    }

    /// Validate transition
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        match (*self, next) {
            (Idle, Discovering) => true,
            (Discovering, Discovered) => true,
            (Discovered, Unconnected) => true,
            (Unconnected, Connecting) => true,
            (Unconnected, Discovering) => true,
            (Unconnected, Connected) => true,
            (Connecting, Connected) => true,
            (Connecting, Unconnected) => true,
            (Connected, Unconnected) => true,
            (Connected, Disconnecting) => true,
            (Disconnecting, Unconnected) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "IDLE",
            ConnectionState::Discovering => "DISCOVERING",
            ConnectionState::Discovered => "DISCOVERED",
            ConnectionState::Unconnected => "UNCONNECTED",
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Disconnecting => "DISCONNECTING",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
