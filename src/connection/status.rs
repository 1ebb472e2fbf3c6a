use chrono::{DateTime, Utc};
use crate::connection::state::ConnectionState;
use crate::media::MediaState;
use crate::protocol::DeviceAddress;

/// Point-in-time view of the source, answered by the dispatch worker
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub connection: ConnectionState,
    pub media: MediaState,

    /// Configured sink name
    pub sink_name: String,

    pub peer_address: Option<DeviceAddress>,
    pub peer_name: Option<String>,

    /// Events lost to a full queue
    pub dropped_events: u64,

    /// Transport ticks since audio last started
    pub transport_ticks: u64,

    /// Wall time of the last connection state change
    pub since: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn is_streaming(&self) -> bool {
        self.connection.is_connected() && self.media.is_streaming()
    }
}
