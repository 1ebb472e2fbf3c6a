use std::sync::Arc;
use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};
use crate::connection::state::ConnectionState;
use crate::connection::status::StatusSnapshot;
use crate::discovery::{DiscoveryFilter, FilterDecision, TargetSink};
use crate::heartbeat::Heartbeat;
use crate::media::{MediaController, MediaOutcome, MediaState};
use crate::message::{Event, EventHandler, EventSender};
use crate::protocol::{
    AudioProducer, AudioState, DeviceAddress, DiscoveryResult, DiscoveryState, InquiryMode,
    LinkState, RadioStack, ScanMode, StackEvent, SECURE_PIN_LEN,
};
use crate::source::SourceConfig;
use crate::utils::{time_delta_ms, Clock};
use crate::Error;

/// Owner of all connection state, driven one event at a time by the
/// dispatch worker.
pub struct ConnectionStateMachine {
    config: Arc<SourceConfig>,
    stack: Arc<dyn RadioStack>,
    producer: Arc<dyn AudioProducer>,
    clock: Arc<dyn Clock>,

    /// Handed to the stack and the heartbeat
    events: EventSender,

    state: ConnectionState,
    media: MediaController,
    filter: DiscoveryFilter,
    target: TargetSink,

    /// Absolute connect deadline in clock milliseconds, only set while Connecting
    deadline: Option<u64>,

    heartbeat: Heartbeat,
    since: DateTime<Utc>,
}

impl ConnectionStateMachine {
    pub fn new(
        config: Arc<SourceConfig>,
        stack: Arc<dyn RadioStack>,
        producer: Arc<dyn AudioProducer>,
        clock: Arc<dyn Clock>,
        events: EventSender,
    ) -> Self {
        let filter = DiscoveryFilter::new(config.sink_name.clone());
        let target = TargetSink::new(config.sink_name.clone());
        let heartbeat = Heartbeat::new(config.heartbeat_period);

        ConnectionStateMachine {
            config,
            stack,
            producer,
            clock,
            events,
            state: ConnectionState::Idle,
            media: MediaController::new(),
            filter,
            target,
            deadline: None,
            heartbeat,
            since: Utc::now(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn media_state(&self) -> MediaState {
        self.media.state()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn target(&self) -> &TargetSink {
        &self.target
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let has_peer = self.state.has_peer();

        StatusSnapshot {
            connection: self.state,
            media: self.media.state(),
            sink_name: self.config.sink_name.clone(),
            peer_address: self.target.address().filter(|_| has_peer),
            peer_name: self.target.peer_name().filter(|_| has_peer).map(str::to_string),
            dropped_events: self.events.dropped(),
            transport_ticks: self.media.ticks(),
            since: self.since,
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if !self.state.can_transition_to(next) {
            warn!("Unexpected transition {} -> {}", self.state, next);
        }
        info!("{} -> {}", self.state, next);

        if self.state == ConnectionState::Connecting {
            self.deadline = None;
        }

        if self.state == ConnectionState::Connected || next == ConnectionState::Connected {
            self.media.reset();
            self.media.reset_ticks();
        }

        if matches!(next, ConnectionState::Idle | ConnectionState::Discovering) {
            self.target.clear();
        }

        self.state = next;
        self.since = Utc::now();
    }

    fn unhandled(&self, event: &Event) {
        warn!("Unhandled event {} in state {}", event.kind(), self.state);
    }

    async fn start_discovery(&self) {
        info!("Starting device discovery...");
        if let Err(e) = self
            .stack
            .start_discovery(InquiryMode::General, self.config.inquiry_len)
            .await
        {
            error!("Failed to start discovery: {}", e);
        }
    }

    async fn set_scan_mode(&self, mode: ScanMode) {
        if let Err(e) = self.stack.set_scan_mode(mode).await {
            error!("Failed to set scan mode {:?}: {}", mode, e);
        }
    }

    async fn on_stack_up(&mut self) {
        info!("Stack up, setting device name {}", self.config.device_name);

        if let Err(e) = self.stack.set_device_name(&self.config.device_name).await {
            error!("Failed to set device name: {}", e);
        }
        if let Err(e) = self.stack.register_callbacks(self.events.clone()).await {
            error!("Failed to register callbacks: {}", e);
        }
        if let Err(e) = self.stack.register_data_source(self.producer.clone()).await {
            error!("Failed to register data source: {}", e);
        }

        self.set_scan_mode(ScanMode::OPEN).await;
        self.heartbeat.start(self.events.clone());

        self.transition(ConnectionState::Discovering);
        self.start_discovery().await;
    }

    async fn on_discovery_result(&mut self, result: DiscoveryResult) {
        let FilterDecision::Match { address, name } = self.filter.evaluate(&result) else {
            return;
        };

        info!("Cancel device discovery ...");
        match self.stack.cancel_discovery().await {
            Ok(()) => {
                self.target.resolve(address, name);
                self.transition(ConnectionState::Discovered);
            }
            Err(e) if e.is_invalid_state() => {
                info!("Discovery not cancelable ({}), still scanning", e);
            }
            Err(e) => {
                warn!("Failed to cancel discovery: {}", e);
            }
        }
    }

    async fn on_connected(&mut self, address: DeviceAddress) {
        info!("A2DP connected to {}", address);
        self.set_scan_mode(ScanMode::HIDDEN).await;
        self.transition(ConnectionState::Connected);
    }

    async fn on_disconnected(&mut self, address: DeviceAddress) {
        info!("A2DP disconnected from {}", address);
        self.set_scan_mode(ScanMode::OPEN).await;
        self.transition(ConnectionState::Unconnected);
    }

    async fn begin_disconnect(&mut self) {
        let Some(address) = self.target.address() else {
            warn!("No peer address to disconnect");
            self.media.reset();
            return;
        };

        info!("Disconnecting from {}", address);
        match self.stack.disconnect(address).await {
            Ok(()) => self.transition(ConnectionState::Disconnecting),
            Err(e) => {
                warn!("Disconnect rejected: {}", e);
                self.media.reset();
            }
        }
    }

    async fn on_pairing(&mut self, event: StackEvent) {
        match event {
            StackEvent::AuthComplete { address, name, success } => {
                if success {
                    info!("Authentication success: {} ({})", name, address);
                } else {
                    error!("Authentication failed with {}", address);
                }
            }
            StackEvent::PinRequest { address, min_16_digit } => {
                let result = if min_16_digit {
                    info!("Input pin code: 0000 0000 0000 0000");
                    self.stack.pin_reply(address, true, &[0u8; SECURE_PIN_LEN]).await
                } else {
                    info!("Input pin code: {}", self.config.pin_code);
                    self.stack.pin_reply(address, true, self.config.pin_code.as_bytes()).await
                };
                if let Err(e) = result {
                    error!("PIN reply failed: {}", e);
                }
            }
            StackEvent::SspConfirmRequest { address, value } => {
                info!("Please compare the numeric value: {:06}", value);
                if let Err(e) = self.stack.ssp_confirm_reply(address, true).await {
                    error!("SSP confirm reply failed: {}", e);
                }
            }
            StackEvent::KeyNotification { passkey, .. } => {
                info!("Passkey: {:06}", passkey);
            }
            other => debug!("Not a pairing event: {}", other),
        }
    }

    async fn handle_idle(&mut self, event: Event) {
        match event {
            Event::Stack(StackEvent::StackUp) => self.on_stack_up().await,
            Event::Heartbeat => trace!("Waiting for stack"),
            event => self.unhandled(&event),
        }
    }

    async fn handle_discovering(&mut self, event: Event) {
        match event {
            Event::Stack(StackEvent::DiscoveryResult(result)) => {
                self.on_discovery_result(result).await;
            }
            Event::Stack(StackEvent::DiscoveryStateChanged(DiscoveryState::Stopped)) => {
                info!("Device discovery stopped without finding {}", self.filter.target_name());
                self.start_discovery().await;
            }
            Event::Stack(StackEvent::DiscoveryStateChanged(DiscoveryState::Started)) => {
                info!("Discovery started");
            }
            Event::Heartbeat => trace!("Discovering"),
            event => self.unhandled(&event),
        }
    }

    async fn handle_discovered(&mut self, event: Event) {
        match event {
            Event::Stack(StackEvent::DiscoveryStateChanged(DiscoveryState::Stopped)) => {
                info!(
                    "Discovery stopped, ready to connect to {}",
                    self.target.peer_name().unwrap_or(self.target.name())
                );
                self.transition(ConnectionState::Unconnected);
            }
            Event::Stack(StackEvent::DiscoveryStateChanged(DiscoveryState::Started)) => {
                debug!("Discovery restarted while stopping");
            }
            Event::Stack(StackEvent::DiscoveryResult(result)) => {
                debug!("Late discovery result from {}", result.address);
            }
            Event::Heartbeat => trace!("Waiting for discovery to stop"),
            event => self.unhandled(&event),
        }
    }

    async fn handle_unconnected(&mut self, event: Event) {
        match event {
            Event::Heartbeat => {
                let Some(address) = self.target.address() else {
                    warn!("No target address, rediscovering");
                    self.transition(ConnectionState::Discovering);
                    self.start_discovery().await;
                    return;
                };

                info!("Connecting to {}", address);
                match self.stack.connect(address).await {
                    Ok(()) => {
                        let deadline = self
                            .clock
                            .now_ms()
                            .saturating_add(self.config.connect_timeout_ms());
                        self.transition(ConnectionState::Connecting);
                        self.deadline = Some(deadline);
                    }
                    Err(e) => {
                        warn!("Connect to {} rejected: {}, rediscovering", address, e);
                        self.transition(ConnectionState::Discovering);
                        self.start_discovery().await;
                    }
                }
            }
            Event::Stack(StackEvent::ConnectionStateChanged { address, state }) => match state {
                LinkState::Connected => {
                    info!("Late connection from {}", address);
                    self.on_connected(address).await;
                }
                state => debug!("Link {:?} while unconnected", state),
            },
            Event::Stack(StackEvent::DiscoveryStateChanged(_)) => {
                debug!("Discovery state change while unconnected");
            }
            Event::Stack(StackEvent::DiscoveryResult(result)) => {
                debug!("Late discovery result from {}", result.address);
            }
            Event::DisconnectRequest => debug!("Nothing to disconnect"),
            event => self.unhandled(&event),
        }
    }

    async fn handle_connecting(&mut self, event: Event) {
        match event {
            Event::Stack(StackEvent::ConnectionStateChanged { address, state }) => match state {
                LinkState::Connected => self.on_connected(address).await,
                LinkState::Disconnected => {
                    info!("Connection to {} failed", address);
                    self.transition(ConnectionState::Unconnected);
                }
                state => debug!("Link {:?} while connecting", state),
            },
            Event::Heartbeat => {
                let now = self.clock.now_ms();
                match self.deadline {
                    Some(deadline) if now >= deadline => {
                        let err = Error::timeout(format!(
                            "no connection after {:?}",
                            self.config.connect_timeout
                        ));
                        warn!("{}", err);
                        self.transition(ConnectionState::Unconnected);
                    }
                    Some(deadline) => {
                        trace!("Connecting, {} ms left", time_delta_ms(now, deadline));
                    }
                    None => {
                        warn!("Connecting without a deadline");
                        self.transition(ConnectionState::Unconnected);
                    }
                }
            }
            Event::DisconnectRequest => debug!("Not connected yet, ignoring disconnect request"),
            event => self.unhandled(&event),
        }
    }

    async fn handle_connected(&mut self, event: Event) {
        let outcome = match event {
            Event::Heartbeat => {
                self.media
                    .on_heartbeat(self.stack.as_ref(), self.producer.as_ref())
                    .await
            }
            Event::Stack(StackEvent::MediaControlAck { command, status }) => {
                debug!("Media control ack {} {:?}", command, status);
                self.media.on_ack(self.stack.as_ref(), command, status).await
            }
            Event::Stack(StackEvent::ConnectionStateChanged { address, state }) => {
                match state {
                    LinkState::Disconnected => self.on_disconnected(address).await,
                    state => debug!("Link {:?} while connected", state),
                }
                MediaOutcome::Continue
            }
            Event::Stack(StackEvent::AudioStateChanged { address, state }) => {
                info!("Audio state {:?} on {}", state, address);
                if state == AudioState::Started {
                    self.media.reset_ticks();
                }
                MediaOutcome::Continue
            }
            Event::Stack(StackEvent::AudioConfig { address }) => {
                info!("Audio configuration from {}", address);
                MediaOutcome::Continue
            }
            Event::DisconnectRequest => {
                info!("Disconnect requested");
                self.media.request_disconnect()
            }
            event => {
                self.unhandled(&event);
                MediaOutcome::Continue
            }
        };

        if outcome == MediaOutcome::Disconnect && self.state == ConnectionState::Connected {
            self.begin_disconnect().await;
        }
    }

    async fn handle_disconnecting(&mut self, event: Event) {
        match event {
            Event::Stack(StackEvent::ConnectionStateChanged { address, state }) => match state {
                LinkState::Disconnected => self.on_disconnected(address).await,
                state => debug!("Link {:?} while disconnecting", state),
            },
            Event::Stack(StackEvent::MediaControlAck { command, .. }) => {
                debug!("Dropping {} ack while disconnecting", command);
            }
            Event::Heartbeat => trace!("Waiting for disconnect"),
            Event::DisconnectRequest => debug!("Disconnect already in progress"),
            event => self.unhandled(&event),
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for ConnectionStateMachine {
    async fn handle(&mut self, event: Event) {
        match event {
            Event::Query(reply) => {
                // Caller may have given up waiting
                let _ = reply.send(self.snapshot());
            }
            Event::Stack(event) if event.is_pairing() => self.on_pairing(event).await,
            event => match self.state {
                ConnectionState::Idle => self.handle_idle(event).await,
                ConnectionState::Discovering => self.handle_discovering(event).await,
                ConnectionState::Discovered => self.handle_discovered(event).await,
                ConnectionState::Unconnected => self.handle_unconnected(event).await,
                ConnectionState::Connecting => self.handle_connecting(event).await,
                ConnectionState::Connected => self.handle_connected(event).await,
                ConnectionState::Disconnecting => self.handle_disconnecting(event).await,
            },
        }
    }
}
