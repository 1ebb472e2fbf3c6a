use log::{debug, info, trace, warn};
use crate::media::state::MediaState;
use crate::protocol::{AckStatus, AudioProducer, MediaCommand, RadioStack};

/// What the connection machine has to do after a media step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaOutcome {
    /// Stay connected
    Continue,

    /// Tear down the link to the sink
    Disconnect,
}

/// Start/stop handshake of the media transport.
///
/// Acks are matched to the outstanding command by kind; the stack sends
/// exactly one ack per media command.
#[derive(Debug, Default)]
pub struct MediaController {
    state: MediaState,

    /// Transport ticks delivered since the stream last started
    ticks: u64,
}

impl MediaController {
    pub fn new() -> Self {
        MediaController::default()
    }

    pub fn state(&self) -> MediaState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn reset_ticks(&mut self) {
        self.ticks = 0;
    }

    /// Back to Idle, used whenever the link comes up or goes away
    pub fn reset(&mut self) {
        if self.state != MediaState::Idle {
            debug!("Media state {} -> {}", self.state, MediaState::Idle);
        }
        self.state = MediaState::Idle;
    }

    fn set_state(&mut self, next: MediaState) {
        if self.state != next {
            info!("Media state {} -> {}", self.state, next);
            self.state = next;
        }
    }

    pub async fn on_heartbeat(
        &mut self,
        stack: &dyn RadioStack,
        producer: &dyn AudioProducer,
    ) -> MediaOutcome {
        match self.state {
            MediaState::Idle => {
                if !producer.is_playback_stopped() {
                    info!(
                        "Output state is {}, checking if the transport is ready",
                        producer.state_description()
                    );
                    if let Err(e) = stack.media_control(MediaCommand::CheckReady).await {
                        warn!("Transport readiness check rejected: {}", e);
                    }
                }
            }
            MediaState::Started => {
                if producer.is_playback_stopped() {
                    info!(
                        "Output state is {}, stopping the transport",
                        producer.state_description()
                    );
                    self.issue_stop(stack).await;
                } else {
                    producer.on_transport_tick();
                    self.ticks += 1;
                }
            }
            MediaState::Starting | MediaState::Stopping => {
                trace!("Media {} waiting for ack", self.state);
            }
            MediaState::WaitDisconnect => return MediaOutcome::Disconnect,
        }

        MediaOutcome::Continue
    }

    pub async fn on_ack(
        &mut self,
        stack: &dyn RadioStack,
        command: MediaCommand,
        status: AckStatus,
    ) -> MediaOutcome {
        match (self.state, command, status) {
            (MediaState::Idle, MediaCommand::CheckReady, AckStatus::Success) => {
                info!("Transport ready, starting playback");
                match stack.media_control(MediaCommand::Start).await {
                    Ok(()) => self.set_state(MediaState::Starting),
                    Err(e) => warn!("Transport start rejected: {}", e),
                }
            }
            (MediaState::Idle, MediaCommand::CheckReady, AckStatus::Failure) => {
                debug!("Transport not ready yet");
            }
            (MediaState::Starting, MediaCommand::Start, AckStatus::Success) => {
                info!("Transport started");
                self.set_state(MediaState::Started);
            }
            (MediaState::Starting, MediaCommand::Start, AckStatus::Failure) => {
                warn!("Transport start failed, will retry");
                self.set_state(MediaState::Idle);
            }
            (MediaState::Stopping, MediaCommand::Stop, AckStatus::Success) => {
                info!("Transport stopped");
                self.set_state(MediaState::Idle);
            }
            (MediaState::Stopping, MediaCommand::Stop, AckStatus::Failure) => {
                debug!("Transport still stopping, asking again");
                self.issue_stop(stack).await;
            }
            (MediaState::WaitDisconnect, _, _) => return MediaOutcome::Disconnect,
            (state, command, status) => {
                debug!("Ignoring {} ack ({:?}) in media state {}", command, status, state);
            }
        }

        MediaOutcome::Continue
    }

    /// Enter WaitDisconnect; the caller tears the link down right away
    pub fn request_disconnect(&mut self) -> MediaOutcome {
        self.set_state(MediaState::WaitDisconnect);
        MediaOutcome::Disconnect
    }

    async fn issue_stop(&mut self, stack: &dyn RadioStack) {
        match stack.media_control(MediaCommand::Stop).await {
            Ok(()) => self.set_state(MediaState::Stopping),
            Err(e) => {
                // No ack will come; the next heartbeat sees the producer stopped and retries
                warn!("Transport stop rejected: {}", e);
                self.set_state(MediaState::Started);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::mock::{Command, RecordingStack, ScriptedProducer};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_start_handshake() {
        let stack = RecordingStack::new();
        let producer = ScriptedProducer::playing();
        let mut media = MediaController::new();

        assert_eq!(media.on_heartbeat(&*stack, &*producer).await, MediaOutcome::Continue);
        assert_eq!(stack.take(), vec![Command::MediaControl(MediaCommand::CheckReady)]);
        assert_eq!(media.state(), MediaState::Idle);

        media.on_ack(&*stack, MediaCommand::CheckReady, AckStatus::Success).await;
        assert_eq!(stack.take(), vec![Command::MediaControl(MediaCommand::Start)]);
        assert_eq!(media.state(), MediaState::Starting);

        media.on_ack(&*stack, MediaCommand::Start, AckStatus::Success).await;
        assert_eq!(media.state(), MediaState::Started);
        assert!(stack.take().is_empty());
    }

    #[tokio::test]
    async fn test_idle_stays_quiet_when_producer_stopped() {
        let stack = RecordingStack::new();
        let producer = ScriptedProducer::stopped();
        let mut media = MediaController::new();

        media.on_heartbeat(&*stack, &*producer).await;
        assert!(stack.commands().is_empty());
        assert_eq!(media.state(), MediaState::Idle);
    }

    #[tokio::test]
    async fn test_start_never_issued_without_ready_ack() {
        let stack = RecordingStack::new();
        let mut media = MediaController::new();

        media.on_ack(&*stack, MediaCommand::CheckReady, AckStatus::Failure).await;
        media.on_ack(&*stack, MediaCommand::Start, AckStatus::Success).await;
        media.on_ack(&*stack, MediaCommand::Stop, AckStatus::Success).await;

        assert!(stack.commands().is_empty());
        assert_eq!(media.state(), MediaState::Idle);
    }

    #[tokio::test]
    async fn test_start_failure_returns_to_idle() {
        let stack = RecordingStack::new();
        let producer = ScriptedProducer::playing();
        let mut media = MediaController::new();

        media.on_ack(&*stack, MediaCommand::CheckReady, AckStatus::Success).await;
        media.on_ack(&*stack, MediaCommand::Start, AckStatus::Failure).await;
        assert_eq!(media.state(), MediaState::Idle);

        // Retried on the next heartbeat
        stack.take();
        media.on_heartbeat(&*stack, &*producer).await;
        assert_eq!(stack.take(), vec![Command::MediaControl(MediaCommand::CheckReady)]);
    }

    #[tokio::test]
    async fn test_stale_ready_ack_ignored_while_starting() {
        let stack = RecordingStack::new();
        let mut media = MediaController::new();

        media.on_ack(&*stack, MediaCommand::CheckReady, AckStatus::Success).await;
        stack.take();

        media.on_ack(&*stack, MediaCommand::CheckReady, AckStatus::Success).await;
        assert_eq!(media.state(), MediaState::Starting);
        assert!(stack.commands().is_empty());
    }

    #[tokio::test]
    async fn test_started_ticks_then_stops() {
        let stack = RecordingStack::new();
        let producer = ScriptedProducer::playing();
        let mut media = MediaController::new();

        media.on_ack(&*stack, MediaCommand::CheckReady, AckStatus::Success).await;
        media.on_ack(&*stack, MediaCommand::Start, AckStatus::Success).await;
        stack.take();

        media.on_heartbeat(&*stack, &*producer).await;
        media.on_heartbeat(&*stack, &*producer).await;
        assert_eq!(producer.ticks(), 2);
        assert_eq!(media.ticks(), 2);
        assert!(stack.commands().is_empty());

        producer.set_stopped(true);
        media.on_heartbeat(&*stack, &*producer).await;
        assert_eq!(stack.take(), vec![Command::MediaControl(MediaCommand::Stop)]);
        assert_eq!(media.state(), MediaState::Stopping);
        assert_eq!(producer.ticks(), 2);

        media.on_ack(&*stack, MediaCommand::Stop, AckStatus::Success).await;
        assert_eq!(media.state(), MediaState::Idle);
    }

    #[tokio::test]
    async fn test_stop_failure_reissues_stop() {
        let stack = RecordingStack::new();
        let producer = ScriptedProducer::stopped();
        let mut media = MediaController::new();

        media.on_ack(&*stack, MediaCommand::CheckReady, AckStatus::Success).await;
        media.on_ack(&*stack, MediaCommand::Start, AckStatus::Success).await;
        media.on_heartbeat(&*stack, &*producer).await;
        stack.take();

        for _ in 0..3 {
            media.on_ack(&*stack, MediaCommand::Stop, AckStatus::Failure).await;
            assert_eq!(media.state(), MediaState::Stopping);
        }
        assert_eq!(stack.count(&Command::MediaControl(MediaCommand::Stop)), 3);
    }

    #[tokio::test]
    async fn test_rejected_stop_retried_from_started() {
        let stack = RecordingStack::new();
        let producer = ScriptedProducer::playing();
        let mut media = MediaController::new();

        media.on_ack(&*stack, MediaCommand::CheckReady, AckStatus::Success).await;
        media.on_ack(&*stack, MediaCommand::Start, AckStatus::Success).await;

        producer.set_stopped(true);
        stack.reject_media.store(true, Ordering::SeqCst);
        media.on_heartbeat(&*stack, &*producer).await;
        assert_eq!(media.state(), MediaState::Started);

        stack.reject_media.store(false, Ordering::SeqCst);
        media.on_heartbeat(&*stack, &*producer).await;
        assert_eq!(media.state(), MediaState::Stopping);
    }

    #[tokio::test]
    async fn test_wait_disconnect() {
        let stack = RecordingStack::new();
        let producer = ScriptedProducer::playing();
        let mut media = MediaController::new();

        assert_eq!(media.request_disconnect(), MediaOutcome::Disconnect);
        assert_eq!(media.state(), MediaState::WaitDisconnect);
        assert_eq!(media.on_heartbeat(&*stack, &*producer).await, MediaOutcome::Disconnect);
        assert!(stack.commands().is_empty());

        media.reset();
        assert_eq!(media.state(), MediaState::Idle);
    }
}
