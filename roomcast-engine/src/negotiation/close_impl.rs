use crate::negotiation::{NegotiationSession, SignalingPhase};
use tracing::{info, warn};

impl NegotiationSession {
    /// Releases the capture, the connection and the candidate buffer. Idempotent.
    pub async fn close(&mut self) {
        if self.phase == SignalingPhase::Closed {
            return;
        }
        self.phase = SignalingPhase::Closed;

        self.candidates.discard();
        self.local_description = None;
        self.remote_description = None;

        if let Some(media) = self.media.take() {
            media.release();
        }
        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close().await {
                warn!("Session {}: error closing connection: {:#}", self.id, e);
            }
        }

        info!("Session {} closed", self.id);
    }
}
