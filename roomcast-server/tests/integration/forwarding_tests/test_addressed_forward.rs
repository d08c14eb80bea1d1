use roomcast_core::{Envelope, EnvelopeKind, IceCandidate, PeerId};

use crate::integration::init_tracing;
use crate::utils::{WsTestClient, spawn_default_relay};

#[tokio::test]
async fn test_addressed_candidate_reaches_only_target() {
    init_tracing();
    let addr = spawn_default_relay().await;

    let (mut a, _) = WsTestClient::join(addr, "fw", "a").await.expect("a joins");
    let (mut b, _) = WsTestClient::join(addr, "fw", "b").await.expect("b joins");
    a.recv_kind(EnvelopeKind::PeerJoined).await.expect("peer_joined");

    let mut candidate = IceCandidate::new("candidate:1 1 udp 2122260223 10.0.0.1 50000 typ host");
    candidate.sdp_mid = Some("0".to_owned());
    candidate.sdp_m_line_index = Some(0);

    // `from` left out on purpose: the relay fills it in.
    let mut envelope = Envelope::candidate(PeerId::from("a"), Some(PeerId::from("b")), candidate);
    envelope.from = None;
    a.send(&envelope).await.expect("send candidate");

    let received = b.recv_kind(EnvelopeKind::Candidate).await.expect("candidate");
    assert_eq!(received.from, Some(PeerId::from("a")));
    assert_eq!(received.to, Some(PeerId::from("b")));
    assert_eq!(received.payload, envelope.payload);

    assert!(a.is_silent_for(100).await, "sender does not get its own envelope");
}
