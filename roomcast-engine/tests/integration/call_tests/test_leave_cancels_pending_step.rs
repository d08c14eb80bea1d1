use roomcast_engine::{CallPhase, EndReason};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{
    HangPoint, InProcessRelay, MockConnector, MockMediaSource, TestPeer, wait_until,
};

/// Lets a step released after the leave run, if anything still polls it.
async fn settle_released_step() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_leave_while_acquiring_media() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (media, gate) = MockMediaSource::gated();
    let mut a = TestPeer::new(relay.clone(), "a");
    let mut b = TestPeer::with_parts(relay.clone(), "b", MockConnector::new(), media);

    a.join("demo").await;
    assert!(a.wait_for_phase(CallPhase::Waiting).await);
    b.join("demo").await;
    assert!(wait_until(1000, || gate.is_reached()).await);

    b.client.leave().await.expect("leave");
    assert_eq!(b.client.state().phase, CallPhase::Ended(EndReason::Left));

    gate.open();
    settle_released_step().await;
    assert!(b.media.acquired().is_empty());
    assert!(b.connector.transports().is_empty());
    assert!(
        a.wait_for_phase(CallPhase::Ended(EndReason::RemoteLeft))
            .await
    );
}

#[tokio::test]
async fn test_leave_while_attaching_media() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (connector, gate) = MockConnector::hanging(HangPoint::Attach);
    let mut a = TestPeer::new(relay.clone(), "a");
    let mut b = TestPeer::with_parts(relay.clone(), "b", connector, MockMediaSource::new());

    a.join("demo").await;
    assert!(a.wait_for_phase(CallPhase::Waiting).await);
    b.join("demo").await;
    assert!(wait_until(1000, || gate.is_reached()).await);

    b.client.leave().await.expect("leave");
    assert_eq!(b.client.state().phase, CallPhase::Ended(EndReason::Left));

    let transport = b.connector.latest().expect("connection created");
    assert!(transport.is_closed());
    assert_eq!(b.media.acquired().len(), 1);
    assert!(b.media.all_released());

    gate.open();
    settle_released_step().await;
    assert!(!transport.is_attached());
}

#[tokio::test]
async fn test_leave_while_creating_offer() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (connector, gate) = MockConnector::hanging(HangPoint::CreateOffer);
    let mut a = TestPeer::with_parts(relay.clone(), "a", connector, MockMediaSource::new());
    let mut b = TestPeer::new(relay.clone(), "b");

    a.join("demo").await;
    assert!(a.wait_for_phase(CallPhase::Waiting).await);
    b.join("demo").await;
    assert!(wait_until(1000, || gate.is_reached()).await);

    a.client.leave().await.expect("leave");
    assert_eq!(a.client.state().phase, CallPhase::Ended(EndReason::Left));

    gate.open();
    settle_released_step().await;
    let transport = a.connector.latest().expect("connection created");
    assert!(transport.is_closed());
    assert!(transport.local_descriptions().is_empty());
    assert!(a.media.all_released());

    // No offer left the initiator after it was gone.
    assert!(
        b.connector
            .transports()
            .iter()
            .all(|t| t.remote_descriptions().is_empty())
    );
}

#[tokio::test]
async fn test_leave_while_setting_remote_offer() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (connector, gate) = MockConnector::hanging(HangPoint::SetRemote);
    let mut a = TestPeer::new(relay.clone(), "a");
    let mut b = TestPeer::with_parts(relay.clone(), "b", connector, MockMediaSource::new());

    a.join("demo").await;
    assert!(a.wait_for_phase(CallPhase::Waiting).await);
    b.join("demo").await;
    assert!(wait_until(1000, || gate.is_reached()).await);

    b.client.leave().await.expect("leave");
    assert_eq!(b.client.state().phase, CallPhase::Ended(EndReason::Left));

    gate.open();
    settle_released_step().await;
    let transport = b.connector.latest().expect("connection created");
    assert!(transport.is_closed());
    assert!(transport.remote_descriptions().is_empty());
    assert!(transport.local_descriptions().is_empty());
    assert!(b.media.all_released());

    // The initiator never received an answer.
    let offerer = a.connector.latest().expect("initiator connection");
    assert!(offerer.remote_descriptions().is_empty());
}
