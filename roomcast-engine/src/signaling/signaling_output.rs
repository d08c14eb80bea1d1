use async_trait::async_trait;
use roomcast_core::{Envelope, IceCandidate, PeerId, SessionDescription};
use tokio::sync::mpsc;
use tracing::warn;

/// Outbound half of negotiation: how a session reaches its remote peer.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_offer(&self, to: &PeerId, offer: SessionDescription);

    async fn send_answer(&self, to: &PeerId, answer: SessionDescription);

    async fn send_candidate(&self, to: &PeerId, candidate: IceCandidate);
}

/// Wraps session messages into envelopes on the relay link.
#[derive(Debug, Clone)]
pub struct RelaySignaling {
    local: PeerId,
    outbound: mpsc::Sender<Envelope>,
}

impl RelaySignaling {
    pub fn new(local: PeerId, outbound: mpsc::Sender<Envelope>) -> Self {
        Self { local, outbound }
    }

    async fn send(&self, envelope: Envelope) {
        let kind = envelope.kind;
        if self.outbound.send(envelope).await.is_err() {
            warn!("Relay link closed; {:?} from {} not sent", kind, self.local);
        }
    }
}

#[async_trait]
impl SignalingOutput for RelaySignaling {
    async fn send_offer(&self, to: &PeerId, offer: SessionDescription) {
        self.send(Envelope::offer(self.local.clone(), Some(to.clone()), offer))
            .await;
    }

    async fn send_answer(&self, to: &PeerId, answer: SessionDescription) {
        self.send(Envelope::answer(self.local.clone(), to.clone(), answer))
            .await;
    }

    async fn send_candidate(&self, to: &PeerId, candidate: IceCandidate) {
        self.send(Envelope::candidate(
            self.local.clone(),
            Some(to.clone()),
            candidate,
        ))
        .await;
    }
}
