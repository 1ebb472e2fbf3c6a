use std::fmt;
use crate::protocol::device::{DeviceAddress, DiscoveryResult};

/// Inquiry progress reported by the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    Started,
    Stopped,
}

/// Profile-level connection state of a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Audio stream state of a connected peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    RemoteSuspend,
    Stopped,
    Started,
}

/// Media transport control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCommand {
    /// Ask whether the transport can be started
    CheckReady,
    Start,
    Stop,
}

impl fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaCommand::CheckReady => "check-ready",
            MediaCommand::Start => "start",
            MediaCommand::Stop => "stop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    Success,
    Failure,
}

impl AckStatus {
    pub fn is_success(&self) -> bool {
        *self == AckStatus::Success
    }
}

/// Everything the radio stack can report. Payloads are owned so the
/// callback context can move them straight into the event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum StackEvent {
    /// Stack enabled and ready for profile setup
    StackUp,
    DiscoveryResult(DiscoveryResult),
    DiscoveryStateChanged(DiscoveryState),
    ConnectionStateChanged {
        address: DeviceAddress,
        state: LinkState,
    },
    AudioStateChanged {
        address: DeviceAddress,
        state: AudioState,
    },
    /// Codec configuration; not expected for a source
    AudioConfig {
        address: DeviceAddress,
    },
    MediaControlAck {
        command: MediaCommand,
        status: AckStatus,
    },
    AuthComplete {
        address: DeviceAddress,
        name: String,
        success: bool,
    },
    PinRequest {
        address: DeviceAddress,
        min_16_digit: bool,
    },
    SspConfirmRequest {
        address: DeviceAddress,
        value: u32,
    },
    KeyNotification {
        address: DeviceAddress,
        passkey: u32,
    },
}

impl StackEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StackEvent::StackUp => "stack-up",
            StackEvent::DiscoveryResult(_) => "discovery-result",
            StackEvent::DiscoveryStateChanged(_) => "discovery-state",
            StackEvent::ConnectionStateChanged { .. } => "connection-state",
            StackEvent::AudioStateChanged { .. } => "audio-state",
            StackEvent::AudioConfig { .. } => "audio-config",
            StackEvent::MediaControlAck { .. } => "media-ctrl-ack",
            StackEvent::AuthComplete { .. } => "auth-complete",
            StackEvent::PinRequest { .. } => "pin-request",
            StackEvent::SspConfirmRequest { .. } => "ssp-confirm-request",
            StackEvent::KeyNotification { .. } => "key-notification",
        }
    }

    /// Pairing traffic is answered the same way in every connection state
    pub fn is_pairing(&self) -> bool {
        matches!(
            self,
            StackEvent::AuthComplete { .. }
                | StackEvent::PinRequest { .. }
                | StackEvent::SspConfirmRequest { .. }
                | StackEvent::KeyNotification { .. }
        )
    }
}

impl fmt::Display for StackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_classification() {
        let pin = StackEvent::PinRequest {
            address: DeviceAddress::default(),
            min_16_digit: false,
        };
        assert!(pin.is_pairing());
        assert!(!StackEvent::StackUp.is_pairing());
        assert!(!StackEvent::DiscoveryStateChanged(DiscoveryState::Stopped).is_pairing());
    }

    #[test]
    fn test_event_names() {
        let ack = StackEvent::MediaControlAck {
            command: MediaCommand::Start,
            status: AckStatus::Failure,
        };
        assert_eq!(ack.to_string(), "media-ctrl-ack");
        assert_eq!(MediaCommand::CheckReady.to_string(), "check-ready");
        assert!(!AckStatus::Failure.is_success());
    }
}
