use roomcast_engine::{LocalMedia, MediaKind};

use crate::integration::init_tracing;
use crate::utils::{InProcessRelay, connected_pair, wait_until};

#[tokio::test]
async fn test_mute_reaches_capture() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (a, _b) = connected_pair(relay, "demo").await;
    let media = a.media.latest().expect("capture");

    a.client.mute_audio(true).await.expect("mute audio");
    assert!(wait_until(1000, || !media.is_enabled(MediaKind::Audio)).await);
    assert!(media.is_enabled(MediaKind::Video));

    a.client.mute_video(true).await.expect("mute video");
    a.client.mute_audio(false).await.expect("unmute audio");
    assert!(
        wait_until(1000, || {
            media.is_enabled(MediaKind::Audio) && !media.is_enabled(MediaKind::Video)
        })
        .await
    );
}
