use roomcast_core::SessionDescription;
use roomcast_engine::{EngineError, LocalMedia, Role};

use crate::integration::init_tracing;
use crate::utils::{SessionFixture, candidate, remote};

#[tokio::test]
async fn test_close_is_idempotent() {
    init_tracing();
    let mut fx = SessionFixture::new(Role::Responder);
    fx.session.handle_candidate(&remote(), candidate(1)).await;

    fx.session.close().await;
    fx.session.close().await;

    assert!(fx.session.is_closed());
    assert!(fx.media.is_released());
    assert!(fx.transport.is_closed());
    assert_eq!(fx.session.buffered_candidates(), 0);
    assert!(fx.session.media().is_none());

    let result = fx
        .session
        .handle_offer(&remote(), SessionDescription::offer("v=0 late"))
        .await;
    assert_eq!(result, Err(EngineError::SessionClosed));

    fx.session.handle_candidate(&remote(), candidate(2)).await;
    assert!(fx.transport.applied_candidates().is_empty());
}
