use roomcast_core::SdpType;
use roomcast_engine::CallPhase;

use crate::integration::init_tracing;
use crate::utils::{InProcessRelay, TestPeer};

#[tokio::test]
async fn test_demo_call_flow() {
    init_tracing();
    let relay = InProcessRelay::new();
    let mut a = TestPeer::new(relay.clone(), "a");
    let mut b = TestPeer::new(relay.clone(), "b");

    assert_eq!(a.client.state().phase, CallPhase::Idle);

    a.join("demo").await;
    assert!(a.wait_for_phase(CallPhase::Waiting).await);

    b.join("demo").await;
    assert!(a.wait_for_phase(CallPhase::Connected).await);
    assert!(b.wait_for_phase(CallPhase::Connected).await);

    // The earlier joiner offered; the responder holds that offer as its remote description.
    let a_transport = a.connector.latest().expect("a connection");
    let b_transport = b.connector.latest().expect("b connection");
    let offer = a_transport.local_descriptions()[0].clone();
    assert_eq!(offer.kind, SdpType::Offer);
    assert_eq!(b_transport.remote_descriptions(), vec![offer]);
    assert_eq!(
        a_transport.remote_descriptions(),
        b_transport.local_descriptions()
    );
    assert!(a_transport.is_attached() && b_transport.is_attached());

    assert_eq!(
        relay.registry().members(&"demo".into()).await,
        vec![a.id(), b.id()]
    );
}
