use crate::integration::init_tracing;
use crate::utils::{InProcessRelay, connected_pair, wait_until};

#[tokio::test]
async fn test_dropping_client_releases_media() {
    init_tracing();
    let relay = InProcessRelay::new();
    let (a, _b) = connected_pair(relay.clone(), "demo").await;
    let media = a.media.clone();
    let transport = a.connector.latest().expect("connection");

    drop(a);

    assert!(wait_until(1000, || media.all_released()).await);
    assert!(wait_until(1000, || transport.is_closed()).await);
}
