use roomcast_core::IceCandidate;
use roomcast_engine::{CallPhase, EndReason, PeerEventKind, TransportState};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{InProcessRelay, connected_pair};

#[tokio::test]
async fn test_stale_session_events_ignored() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (mut a, mut b) = connected_pair(relay, "demo").await;

    let old = a.connector.latest().expect("first connection");
    old.emit(PeerEventKind::StateChanged(TransportState::Failed))
        .await;
    assert!(
        a.wait_for_phase(CallPhase::Ended(EndReason::PeerUnreachable))
            .await
    );
    b.connector
        .latest()
        .expect("b connection")
        .emit(PeerEventKind::StateChanged(TransportState::Failed))
        .await;
    assert!(
        b.wait_for_phase(CallPhase::Ended(EndReason::PeerUnreachable))
            .await
    );

    a.client.retry().await.expect("a retries");
    assert!(a.wait_for_phase(CallPhase::Connected).await);
    assert!(b.wait_for_phase(CallPhase::Connected).await);

    // Events still trickling out of the first connection belong to a dead session.
    old.emit(PeerEventKind::StateChanged(TransportState::Failed))
        .await;
    old.emit(PeerEventKind::LocalCandidate(IceCandidate::new(
        "candidate:1 1 udp 1 10.0.0.1 5000 typ host",
    )))
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(a.client.state().phase, CallPhase::Connected);
    let fresh = b.connector.latest().expect("b second connection");
    assert!(fresh.applied_candidates().is_empty());
}
