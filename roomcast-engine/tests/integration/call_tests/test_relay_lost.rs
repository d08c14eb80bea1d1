use roomcast_engine::{CallPhase, EndReason};

use crate::integration::init_tracing;
use crate::utils::{InProcessRelay, connected_pair};

#[tokio::test]
async fn test_relay_lost() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (mut a, mut b) = connected_pair(relay.clone(), "demo").await;

    relay.sever(&a.id());

    assert!(a.wait_for_phase(CallPhase::Ended(EndReason::RelayLost)).await);
    assert!(a.media.all_released());
    assert!(a.connector.latest().expect("connection").is_closed());

    // The relay treats the lost link as a departure.
    assert!(b.wait_for_phase(CallPhase::Ended(EndReason::RemoteLeft)).await);
}
