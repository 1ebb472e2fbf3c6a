use std::sync::Arc;
use crate::protocol::device::DeviceAddress;
use crate::protocol::events::MediaCommand;
use crate::{EventSender, Result};

/// Inquiry access code used for discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryMode {
    General,
}

/// Page/inquiry scan settings of the local adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMode {
    pub connectable: bool,
    pub discoverable: bool,
}

impl ScanMode {
    /// Visible and accepting connections, used while looking for a sink
    pub const OPEN: ScanMode = ScanMode {
        connectable: true,
        discoverable: true,
    };

    /// Invisible, used while a sink is connected
    pub const HIDDEN: ScanMode = ScanMode {
        connectable: false,
        discoverable: false,
    };
}

/// Commands the core issues to the radio/profile stack.
///
/// Every call only reports whether the stack accepted the command. The
/// outcome arrives later as a [`StackEvent`](crate::StackEvent) on the
/// sender handed over in `register_callbacks`.
#[async_trait::async_trait]
pub trait RadioStack: Send + Sync {
    async fn set_device_name(&self, name: &str) -> Result<()>;

    async fn register_callbacks(&self, events: EventSender) -> Result<()>;

    /// The stack pulls audio from the producer on its own thread
    async fn register_data_source(&self, producer: Arc<dyn AudioProducer>) -> Result<()>;

    async fn set_scan_mode(&self, mode: ScanMode) -> Result<()>;

    async fn start_discovery(&self, mode: InquiryMode, inquiry_len: u8) -> Result<()>;

    /// `Error::InvalidState` when the inquiry had already stopped
    async fn cancel_discovery(&self) -> Result<()>;

    async fn connect(&self, address: DeviceAddress) -> Result<()>;

    async fn disconnect(&self, address: DeviceAddress) -> Result<()>;

    async fn media_control(&self, command: MediaCommand) -> Result<()>;

    async fn pin_reply(&self, address: DeviceAddress, accept: bool, pin: &[u8]) -> Result<()>;

    async fn ssp_confirm_reply(&self, address: DeviceAddress, accept: bool) -> Result<()>;
}

/// The audio pipeline feeding the transport
pub trait AudioProducer: Send + Sync {
    fn is_playback_stopped(&self) -> bool;

    /// Called once per heartbeat while the transport is started
    fn on_transport_tick(&self);

    /// Fill `buf` with encoded audio, returning the number of bytes written
    fn fill_buffer(&self, buf: &mut [u8]) -> usize;

    fn state_description(&self) -> String {
        if self.is_playback_stopped() {
            "STOPPED".to_string()
        } else {
            "PLAYING".to_string()
        }
    }
}
