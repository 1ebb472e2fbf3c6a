// Simulated Sink Example
//
// This example demonstrates:
// - Starting an A2DP source against an in-process radio stack
// - Discovery filtering (a phone is seen before the speaker shows up)
// - Connecting, starting and stopping the media transport
// - Reading the dispatched status and releasing the sink
//
// Usage:
//   RUST_LOG=debug cargo run --example simulated_sink

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use a2dp::{
    A2dpSource, AckStatus, AudioProducer, AudioState, DeviceAddress, DeviceProperty, DiscoveryResult,
    DiscoveryState, EventSender, InquiryMode, LinkState, MediaCommand, PropertyType, RadioStack,
    Result, ScanMode, SourceConfig, StackEvent,
};
use log::{info, warn};

const SPEAKER_NAME: &str = "ESP_SPEAKER";

/// Radio latency of the simulated stack
const LATENCY: Duration = Duration::from_millis(40);

/// A stack with one phone and one speaker in range. The speaker only answers
/// the second inquiry.
struct SimulatedStack {
    events: Mutex<Option<EventSender>>,
    inquiries: AtomicU32,
}

impl SimulatedStack {
    fn new() -> Self {
        SimulatedStack {
            events: Mutex::new(None),
            inquiries: AtomicU32::new(0),
        }
    }

    /// Deliver events after the radio latency, like a callback thread would
    fn later(&self, events: Vec<StackEvent>) {
        let Some(sender) = self.events.lock().ok().and_then(|s| s.clone()) else {
            return;
        };

        tokio::spawn(async move {
            for event in events {
                tokio::time::sleep(LATENCY).await;
                if let Err(e) = sender.stack_event(event) {
                    warn!("Simulated stack dropped an event: {}", e);
                }
            }
        });
    }

    /// Decode raw inquiry properties as they come off the HCI layer
    fn inquiry_result(address: [u8; 6], cod: u32, name: &str) -> Result<StackEvent> {
        let mut eir = vec![(name.len() + 1) as u8, 0x09];
        eir.extend_from_slice(name.as_bytes());

        let properties = vec![
            DeviceProperty::from_raw(PropertyType::ClassOfDevice, &cod.to_le_bytes())?,
            DeviceProperty::from_raw(PropertyType::Rssi, &[(-52i8) as u8])?,
            DeviceProperty::from_raw(PropertyType::Eir, &eir)?,
        ];

        Ok(StackEvent::DiscoveryResult(DiscoveryResult::new(
            DeviceAddress::new(address),
            properties,
        )))
    }
}

#[async_trait::async_trait]
impl RadioStack for SimulatedStack {
    async fn set_device_name(&self, name: &str) -> Result<()> {
        info!("[stack] device name {}", name);
        Ok(())
    }

    async fn register_callbacks(&self, events: EventSender) -> Result<()> {
        if let Ok(mut slot) = self.events.lock() {
            *slot = Some(events);
        }
        Ok(())
    }

    async fn register_data_source(&self, producer: Arc<dyn AudioProducer>) -> Result<()> {
        let mut frame = [0u8; 512];
        info!("[stack] data source ready, first pull {} bytes", producer.fill_buffer(&mut frame));
        Ok(())
    }

    async fn set_scan_mode(&self, mode: ScanMode) -> Result<()> {
        info!("[stack] scan mode {:?}", mode);
        Ok(())
    }

    async fn start_discovery(&self, _mode: InquiryMode, inquiry_len: u8) -> Result<()> {
        let round = self.inquiries.fetch_add(1, Ordering::SeqCst);
        info!("[stack] inquiry #{} for {} units", round + 1, inquiry_len);

        let mut events = vec![
            StackEvent::DiscoveryStateChanged(DiscoveryState::Started),
            Self::inquiry_result([0x5c, 0xf3, 0x70, 0x01, 0x02, 0x03], 0x5a_020c, SPEAKER_NAME)?,
        ];
        if round > 0 {
            events.push(Self::inquiry_result(
                [0x30, 0xae, 0xa4, 0x7a, 0x1c, 0x02],
                0x24_0414,
                SPEAKER_NAME,
            )?);
        }
        events.push(StackEvent::DiscoveryStateChanged(DiscoveryState::Stopped));

        self.later(events);
        Ok(())
    }

    async fn cancel_discovery(&self) -> Result<()> {
        info!("[stack] cancel inquiry");
        Ok(())
    }

    async fn connect(&self, address: DeviceAddress) -> Result<()> {
        info!("[stack] connect {}", address);
        self.later(vec![
            StackEvent::ConnectionStateChanged {
                address,
                state: LinkState::Connecting,
            },
            StackEvent::ConnectionStateChanged {
                address,
                state: LinkState::Connected,
            },
        ]);
        Ok(())
    }

    async fn disconnect(&self, address: DeviceAddress) -> Result<()> {
        info!("[stack] disconnect {}", address);
        self.later(vec![StackEvent::ConnectionStateChanged {
            address,
            state: LinkState::Disconnected,
        }]);
        Ok(())
    }

    async fn media_control(&self, command: MediaCommand) -> Result<()> {
        info!("[stack] media {}", command);
        let mut events = vec![StackEvent::MediaControlAck {
            command,
            status: AckStatus::Success,
        }];
        if command == MediaCommand::Start {
            events.push(StackEvent::AudioStateChanged {
                address: DeviceAddress::new([0x30, 0xae, 0xa4, 0x7a, 0x1c, 0x02]),
                state: AudioState::Started,
            });
        }
        self.later(events);
        Ok(())
    }

    async fn pin_reply(&self, address: DeviceAddress, accept: bool, _pin: &[u8]) -> Result<()> {
        info!("[stack] pin reply to {}: {}", address, accept);
        Ok(())
    }

    async fn ssp_confirm_reply(&self, address: DeviceAddress, accept: bool) -> Result<()> {
        info!("[stack] ssp confirm to {}: {}", address, accept);
        Ok(())
    }
}

/// Silence generator that can be paused
#[derive(Default)]
struct SilenceProducer {
    paused: AtomicBool,
    ticks: AtomicU32,
}

impl AudioProducer for SilenceProducer {
    fn is_playback_stopped(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn on_transport_tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn fill_buffer(&self, buf: &mut [u8]) -> usize {
        buf.fill(0);
        buf.len()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = SourceConfig::builder()
        .sink_name(SPEAKER_NAME)
        .heartbeat_period(Duration::from_millis(200))
        .connect_timeout(Duration::from_millis(1000))
        .inquiry_len(4)
        .build()?;

    info!("Looking for sink {}", config.sink_name);

    let producer = Arc::new(SilenceProducer::default());
    let source = A2dpSource::start(config, Arc::new(SimulatedStack::new()), producer.clone()).await?;

    for second in 1..=6 {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let status = source.status().await?;
        info!(
            "t={}s {} / {} peer={:?} ticks={}",
            second,
            status.connection,
            status.media,
            status.peer_address.map(|a| a.to_string()),
            status.transport_ticks
        );

        if second == 4 {
            info!("Pausing playback");
            producer.paused.store(true, Ordering::SeqCst);
        }
    }

    source.disconnect()?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    info!("Final state: {}", source.status().await?.connection);

    source.shutdown().await?;
    info!("Producer saw {} transport ticks", producer.ticks.load(Ordering::SeqCst));
    Ok(())
}
