// Integration tests for the A2DP source
//
// These tests drive the whole core through A2dpSource: the event queue,
// the dispatch worker, the heartbeat and the connection state machine.

mod common;

use std::sync::Arc;
use std::time::Duration;
use a2dp::{
    A2dpSource, AckStatus, ConnectionState, DiscoveryState, Error, Event, InquiryMode, LinkState,
    ManualClock, MediaCommand, MediaState, ScanMode, SourceConfig, StackEvent, StatusSnapshot,
};
use common::{
    cooperative_sink, init_logging, scan_result, sink_address, Command, RecordingStack,
    ScriptedProducer, SINK_NAME, SPEAKER_COD,
};

fn config(heartbeat: Duration) -> SourceConfig {
    SourceConfig::builder()
        .sink_name(SINK_NAME)
        .heartbeat_period(heartbeat)
        .connect_timeout(Duration::from_millis(5000))
        .build()
        .expect("Failed to build source config")
}

/// Poll the dispatched status until `check` holds
async fn wait_for_status<F>(source: &A2dpSource, mut check: F) -> StatusSnapshot
where
    F: FnMut(&StatusSnapshot) -> bool,
{
    let mut status = source.status().await.unwrap();
    for _ in 0..400 {
        if check(&status) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        status = source.status().await.unwrap();
    }
    status
}

#[tokio::test]
async fn test_rejects_invalid_config() {
    init_logging();

    let result = A2dpSource::start(
        SourceConfig::default(),
        RecordingStack::new(),
        ScriptedProducer::playing(),
    )
    .await;

    assert!(matches!(result, Err(Error::Configuration(_))));

    let unbounded = SourceConfig {
        connect_timeout: Duration::MAX,
        ..SourceConfig::new(SINK_NAME)
    };
    let result = A2dpSource::start(unbounded, RecordingStack::new(), ScriptedProducer::playing()).await;
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[tokio::test]
async fn test_stack_up_starts_discovery() {
    init_logging();
    let stack = RecordingStack::new();

    let source = A2dpSource::start(
        config(Duration::from_secs(3600)),
        stack.clone(),
        ScriptedProducer::stopped(),
    )
    .await
    .unwrap();

    let status = source.status().await.unwrap();
    assert_eq!(status.connection, ConnectionState::Discovering);
    assert_eq!(status.sink_name, SINK_NAME);
    assert_eq!(status.peer_address, None);

    assert_eq!(
        stack.commands(),
        vec![
            Command::SetDeviceName("Squeezelite".to_string()),
            Command::RegisterCallbacks,
            Command::RegisterDataSource,
            Command::SetScanMode(ScanMode::OPEN),
            Command::StartDiscovery(InquiryMode::General, 10),
        ]
    );

    source.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cooperative_sink_reaches_streaming() {
    init_logging();
    let stack = cooperative_sink();
    let producer = ScriptedProducer::playing();

    let source = A2dpSource::start(config(Duration::from_millis(10)), stack.clone(), producer.clone())
        .await
        .unwrap();

    let status = wait_for_status(&source, |s| s.is_streaming()).await;
    assert_eq!(status.connection, ConnectionState::Connected);
    assert_eq!(status.media, MediaState::Started);
    assert_eq!(status.peer_address, Some(sink_address()));
    assert_eq!(status.peer_name.as_deref(), Some(SINK_NAME));

    let commands = stack.commands();
    assert!(commands.contains(&Command::Connect(sink_address())));
    assert!(commands.contains(&Command::SetScanMode(ScanMode::HIDDEN)));

    // CheckReady always precedes Start
    let ready = commands
        .iter()
        .position(|c| *c == Command::MediaControl(MediaCommand::CheckReady));
    let start = commands
        .iter()
        .position(|c| *c == Command::MediaControl(MediaCommand::Start));
    assert!(ready.unwrap() < start.unwrap());

    // Producer going quiet stops the transport
    producer.set_stopped(true);
    let status = wait_for_status(&source, |s| s.media == MediaState::Idle).await;
    assert_eq!(status.connection, ConnectionState::Connected);
    assert!(stack.count(&Command::MediaControl(MediaCommand::Stop)) >= 1);

    source.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_disconnect_and_reconnect() {
    init_logging();
    let stack = cooperative_sink();

    let source = A2dpSource::start(
        config(Duration::from_millis(10)),
        stack.clone(),
        ScriptedProducer::stopped(),
    )
    .await
    .unwrap();

    wait_for_status(&source, |s| s.connection == ConnectionState::Connected).await;

    source.disconnect().unwrap();
    // The cooperative sink drops the link and the next heartbeat reconnects
    wait_for_status(&source, |s| {
        s.connection == ConnectionState::Connected
            && stack.count(&Command::Connect(sink_address())) >= 2
    })
    .await;

    assert_eq!(stack.count(&Command::Disconnect(sink_address())), 1);
    assert!(stack.count(&Command::Connect(sink_address())) >= 2);
    assert!(stack.count(&Command::SetScanMode(ScanMode::OPEN)) >= 2);

    source.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_connect_timeout_with_manual_clock() {
    init_logging();
    let stack = RecordingStack::new();
    let clock = ManualClock::new(0);

    let source = A2dpSource::start_with_clock(
        config(Duration::from_secs(3600)),
        stack.clone(),
        ScriptedProducer::stopped(),
        Arc::new(clock.clone()),
    )
    .await
    .unwrap();

    let events = source.events();
    events.stack_event(scan_result(sink_address(), SPEAKER_COD, SINK_NAME)).unwrap();
    events.stack_event(StackEvent::DiscoveryStateChanged(DiscoveryState::Stopped)).unwrap();
    assert_eq!(source.status().await.unwrap().connection, ConnectionState::Unconnected);

    clock.set(1000);
    events.submit(Event::Heartbeat).unwrap();
    assert_eq!(source.status().await.unwrap().connection, ConnectionState::Connecting);

    clock.set(5999);
    events.submit(Event::Heartbeat).unwrap();
    assert_eq!(source.status().await.unwrap().connection, ConnectionState::Connecting);

    clock.set(6000);
    events.submit(Event::Heartbeat).unwrap();
    assert_eq!(source.status().await.unwrap().connection, ConnectionState::Unconnected);
    assert_eq!(stack.count(&Command::Connect(sink_address())), 1);

    // A reply that shows up after the timeout still counts
    events
        .stack_event(StackEvent::ConnectionStateChanged {
            address: sink_address(),
            state: LinkState::Connected,
        })
        .unwrap();
    let status = source.status().await.unwrap();
    assert_eq!(status.connection, ConnectionState::Connected);
    assert_eq!(status.media, MediaState::Idle);

    source.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stray_acks_before_connect_are_ignored() {
    init_logging();
    let stack = RecordingStack::new();

    let source = A2dpSource::start(
        config(Duration::from_secs(3600)),
        stack.clone(),
        ScriptedProducer::playing(),
    )
    .await
    .unwrap();

    let events = source.events();
    events
        .stack_event(StackEvent::MediaControlAck {
            command: MediaCommand::CheckReady,
            status: AckStatus::Success,
        })
        .unwrap();
    events.submit(Event::Heartbeat).unwrap();

    let status = source.status().await.unwrap();
    assert_eq!(status.connection, ConnectionState::Discovering);
    assert_eq!(status.media, MediaState::Idle);
    assert!(!stack.commands().iter().any(|c| matches!(c, Command::MediaControl(_))));

    source.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_pin_request_while_discovering() {
    init_logging();
    let stack = RecordingStack::new();

    let source = A2dpSource::start(
        SourceConfig::builder()
            .sink_name(SINK_NAME)
            .heartbeat_period(Duration::from_secs(3600))
            .pin_code("0000")
            .build()
            .unwrap(),
        stack.clone(),
        ScriptedProducer::stopped(),
    )
    .await
    .unwrap();

    source
        .events()
        .stack_event(StackEvent::PinRequest {
            address: sink_address(),
            min_16_digit: false,
        })
        .unwrap();

    assert_eq!(source.status().await.unwrap().connection, ConnectionState::Discovering);
    assert_eq!(
        stack.count(&Command::PinReply(sink_address(), true, b"0000".to_vec())),
        1
    );

    source.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_event_queue() {
    init_logging();

    let source = A2dpSource::start(
        config(Duration::from_millis(10)),
        RecordingStack::new(),
        ScriptedProducer::stopped(),
    )
    .await
    .unwrap();

    let events = source.events();
    assert!(source.is_running());
    source.shutdown().await.unwrap();

    assert!(events.is_closed());
    assert!(matches!(events.submit(Event::Heartbeat), Err(Error::Shutdown)));
}
