use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::integration::init_tracing;
use crate::utils::spawn_default_relay;

#[tokio::test]
async fn test_banner_on_root() {
    init_tracing();
    let addr = spawn_default_relay().await;

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("write request");

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");

    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains("/ws?room="), "{}", response);
}
