use roomcast_engine::{CallPhase, EndReason};

use crate::integration::init_tracing;
use crate::utils::{InProcessRelay, TestPeer, connected_pair};

#[tokio::test]
async fn test_room_full() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (_a, _b) = connected_pair(relay.clone(), "demo").await;

    let mut c = TestPeer::new(relay.clone(), "c");
    c.join("demo").await;

    assert!(c.wait_for_phase(CallPhase::Ended(EndReason::RoomFull)).await);
    assert!(c.media.acquired().is_empty());
    assert_eq!(relay.registry().members(&"demo".into()).await.len(), 2);
}
