use roomcast_engine::{CallPhase, EndReason};

use crate::integration::init_tracing;
use crate::utils::{InProcessRelay, MockConnector, MockMediaSource, TestPeer, wait_for_state};

#[tokio::test]
async fn test_unavailable_connector_releases_media() {
    init_tracing();
    let relay = InProcessRelay::new();
    let mut a = TestPeer::new(relay.clone(), "a");
    let mut b = TestPeer::with_parts(
        relay.clone(),
        "b",
        MockConnector::unavailable(),
        MockMediaSource::new(),
    );

    a.join("demo").await;
    b.join("demo").await;

    let failed = wait_for_state(&mut b.states, |state| {
        matches!(
            &state.phase,
            CallPhase::Ended(EndReason::NegotiationFailed(reason)) if reason.contains("unavailable")
        )
    })
    .await;
    assert!(failed);
    assert_eq!(b.media.acquired().len(), 1);
    assert!(b.media.all_released());
}

#[tokio::test]
async fn test_rejected_media_closes_connection() {
    init_tracing();
    let relay = InProcessRelay::new();
    let mut a = TestPeer::new(relay.clone(), "a");
    let mut b = TestPeer::with_parts(
        relay.clone(),
        "b",
        MockConnector::rejecting_attach(),
        MockMediaSource::new(),
    );

    a.join("demo").await;
    b.join("demo").await;

    let failed = wait_for_state(&mut b.states, |state| {
        matches!(
            &state.phase,
            CallPhase::Ended(EndReason::NegotiationFailed(reason)) if reason.contains("attach")
        )
    })
    .await;
    assert!(failed);
    let transport = b.connector.latest().expect("connection created");
    assert!(!transport.is_attached());
    assert!(transport.is_closed());
    assert!(b.media.all_released());
}
