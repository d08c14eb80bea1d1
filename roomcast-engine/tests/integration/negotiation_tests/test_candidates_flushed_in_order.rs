use roomcast_core::SessionDescription;
use roomcast_engine::Role;

use crate::integration::init_tracing;
use crate::utils::{SessionFixture, candidate, remote};

#[tokio::test]
async fn test_candidates_flushed_in_order() {
    init_tracing();
    let mut fx = SessionFixture::new(Role::Responder);

    for n in 1..=3 {
        fx.session.handle_candidate(&remote(), candidate(n)).await;
    }
    assert_eq!(fx.session.buffered_candidates(), 3);
    assert!(fx.transport.applied_candidates().is_empty());

    fx.session
        .handle_offer(&remote(), SessionDescription::offer("v=0 offer"))
        .await
        .expect("offer accepted");

    assert_eq!(
        fx.transport.applied_candidates(),
        vec![candidate(1), candidate(2), candidate(3)]
    );
    assert_eq!(fx.session.buffered_candidates(), 0);

    // After the flush candidates go straight to the connection.
    fx.session.handle_candidate(&remote(), candidate(4)).await;
    assert_eq!(fx.session.buffered_candidates(), 0);
    assert_eq!(fx.transport.applied_candidates().len(), 4);
}

#[tokio::test]
async fn test_candidates_from_strangers_dropped() {
    init_tracing();
    let mut fx = SessionFixture::new(Role::Responder);

    fx.session
        .handle_candidate(&"intruder".into(), candidate(1))
        .await;

    assert_eq!(fx.session.buffered_candidates(), 0);
}
