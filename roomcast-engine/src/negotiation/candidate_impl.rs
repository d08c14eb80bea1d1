use crate::negotiation::NegotiationSession;
use roomcast_core::{IceCandidate, PeerId};
use tracing::{trace, warn};

impl NegotiationSession {
    /// Buffers or applies a remote candidate, depending on whether the remote description is set.
    pub async fn handle_candidate(&mut self, from: &PeerId, candidate: IceCandidate) {
        if self.is_closed() {
            trace!("Session {}: dropping candidate after close", self.id);
            return;
        }
        if from != &self.remote {
            warn!("Session {}: candidate from unexpected peer {}", self.id, from);
            return;
        }
        let Some(connection) = self.connection.as_deref() else {
            return;
        };
        self.candidates.enqueue(connection, candidate).await;
    }

    /// Sends a locally gathered candidate to the remote peer.
    pub async fn send_local_candidate(&self, candidate: IceCandidate) {
        if self.is_closed() {
            return;
        }
        self.signaling.send_candidate(&self.remote, candidate).await;
    }
}
