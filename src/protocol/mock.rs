//! In-memory radio stack and audio producer for tests and simulations.
//!
//! [`RecordingStack`] records every command it receives. Individual commands
//! can be made to fail, and a cooperative stack answers like a sink that is
//! always in range and accepts everything.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::protocol::constants::EIR_TYPE_CMPL_LOCAL_NAME;
use crate::protocol::device::{ClassOfDevice, DeviceAddress, DeviceProperty, DiscoveryResult};
use crate::protocol::events::{
    AckStatus, DiscoveryState, LinkState, MediaCommand, StackEvent,
};
use crate::protocol::stack::{AudioProducer, InquiryMode, RadioStack, ScanMode};
use crate::{Error, EventSender, Result};

/// A command as seen by the stack
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetDeviceName(String),
    RegisterCallbacks,
    RegisterDataSource,
    SetScanMode(ScanMode),
    StartDiscovery(InquiryMode, u8),
    CancelDiscovery,
    Connect(DeviceAddress),
    Disconnect(DeviceAddress),
    MediaControl(MediaCommand),
    PinReply(DeviceAddress, bool, Vec<u8>),
    SspConfirmReply(DeviceAddress, bool),
}

/// Inquiry result for a device advertising `name` as its complete EIR name
pub fn scan_result(address: DeviceAddress, cod: u32, name: &str) -> StackEvent {
    let mut eir = vec![(name.len() + 1) as u8, EIR_TYPE_CMPL_LOCAL_NAME];
    eir.extend_from_slice(name.as_bytes());

    StackEvent::DiscoveryResult(DiscoveryResult::new(
        address,
        vec![
            DeviceProperty::ClassOfDevice(ClassOfDevice(cod)),
            DeviceProperty::Rssi(-48),
            DeviceProperty::Eir(eir),
        ],
    ))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The sink a cooperative stack reports on every inquiry
#[derive(Debug, Clone)]
struct Peer {
    address: DeviceAddress,
    cod: u32,
    name: String,
}

#[derive(Default)]
pub struct RecordingStack {
    commands: Mutex<Vec<Command>>,
    events: Mutex<Option<EventSender>>,
    peer: Option<Peer>,

    pub reject_connect: AtomicBool,
    pub cancel_already_stopped: AtomicBool,
    pub reject_media: AtomicBool,
    pub reject_disconnect: AtomicBool,
}

impl RecordingStack {
    /// Records commands, never answers
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingStack::default())
    }

    /// Answers every accepted command as the given sink would
    pub fn cooperative(address: DeviceAddress, cod: u32, name: impl Into<String>) -> Arc<Self> {
        Arc::new(RecordingStack {
            peer: Some(Peer {
                address,
                cod,
                name: name.into(),
            }),
            ..RecordingStack::default()
        })
    }

    pub fn commands(&self) -> Vec<Command> {
        lock(&self.commands).clone()
    }

    /// Drain the recorded commands
    pub fn take(&self) -> Vec<Command> {
        std::mem::take(&mut *lock(&self.commands))
    }

    pub fn count(&self, wanted: &Command) -> usize {
        lock(&self.commands).iter().filter(|c| *c == wanted).count()
    }

    fn record(&self, command: Command) {
        lock(&self.commands).push(command);
    }

    fn reply(&self, event: StackEvent) {
        if self.peer.is_none() {
            return;
        }
        if let Some(events) = lock(&self.events).as_ref() {
            // A full or closed queue loses the reply, as it would on a radio
            let _ = events.stack_event(event);
        }
    }
}

#[async_trait::async_trait]
impl RadioStack for RecordingStack {
    async fn set_device_name(&self, name: &str) -> Result<()> {
        self.record(Command::SetDeviceName(name.to_string()));
        Ok(())
    }

    async fn register_callbacks(&self, events: EventSender) -> Result<()> {
        self.record(Command::RegisterCallbacks);
        *lock(&self.events) = Some(events);
        Ok(())
    }

    async fn register_data_source(&self, _producer: Arc<dyn AudioProducer>) -> Result<()> {
        self.record(Command::RegisterDataSource);
        Ok(())
    }

    async fn set_scan_mode(&self, mode: ScanMode) -> Result<()> {
        self.record(Command::SetScanMode(mode));
        Ok(())
    }

    async fn start_discovery(&self, mode: InquiryMode, inquiry_len: u8) -> Result<()> {
        self.record(Command::StartDiscovery(mode, inquiry_len));
        self.reply(StackEvent::DiscoveryStateChanged(DiscoveryState::Started));
        if let Some(peer) = &self.peer {
            self.reply(scan_result(peer.address, peer.cod, &peer.name));
        }
        Ok(())
    }

    async fn cancel_discovery(&self) -> Result<()> {
        self.record(Command::CancelDiscovery);
        if self.cancel_already_stopped.load(Ordering::SeqCst) {
            return Err(Error::invalid_state("inquiry not running"));
        }
        self.reply(StackEvent::DiscoveryStateChanged(DiscoveryState::Stopped));
        Ok(())
    }

    async fn connect(&self, address: DeviceAddress) -> Result<()> {
        self.record(Command::Connect(address));
        if self.reject_connect.load(Ordering::SeqCst) {
            return Err(Error::stack("connect rejected"));
        }
        self.reply(StackEvent::ConnectionStateChanged {
            address,
            state: LinkState::Connected,
        });
        Ok(())
    }

    async fn disconnect(&self, address: DeviceAddress) -> Result<()> {
        self.record(Command::Disconnect(address));
        if self.reject_disconnect.load(Ordering::SeqCst) {
            return Err(Error::stack("disconnect rejected"));
        }
        self.reply(StackEvent::ConnectionStateChanged {
            address,
            state: LinkState::Disconnected,
        });
        Ok(())
    }

    async fn media_control(&self, command: MediaCommand) -> Result<()> {
        self.record(Command::MediaControl(command));
        if self.reject_media.load(Ordering::SeqCst) {
            return Err(Error::stack("media control busy"));
        }
        self.reply(StackEvent::MediaControlAck {
            command,
            status: AckStatus::Success,
        });
        Ok(())
    }

    async fn pin_reply(&self, address: DeviceAddress, accept: bool, pin: &[u8]) -> Result<()> {
        self.record(Command::PinReply(address, accept, pin.to_vec()));
        Ok(())
    }

    async fn ssp_confirm_reply(&self, address: DeviceAddress, accept: bool) -> Result<()> {
        self.record(Command::SspConfirmReply(address, accept));
        Ok(())
    }
}

/// Audio producer whose play/stop state is flipped from outside
#[derive(Default)]
pub struct ScriptedProducer {
    stopped: AtomicBool,
    ticks: AtomicU64,
}

impl ScriptedProducer {
    pub fn playing() -> Arc<Self> {
        Arc::new(ScriptedProducer::default())
    }

    pub fn stopped() -> Arc<Self> {
        let producer = ScriptedProducer::default();
        producer.stopped.store(true, Ordering::SeqCst);
        Arc::new(producer)
    }

    pub fn set_stopped(&self, stopped: bool) {
        self.stopped.store(stopped, Ordering::SeqCst);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl AudioProducer for ScriptedProducer {
    fn is_playback_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn on_transport_tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn fill_buffer(&self, buf: &mut [u8]) -> usize {
        buf.fill(0);
        buf.len()
    }
}
