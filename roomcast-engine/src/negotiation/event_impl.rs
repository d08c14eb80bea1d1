use crate::error::EngineError;
use crate::negotiation::NegotiationSession;
use crate::transport::TransportState;
use tracing::{debug, info, warn};

impl NegotiationSession {
    /// Applies a connectivity change reported by the transport.
    ///
    /// Losing connectivity closes the session with [`EngineError::PeerUnreachable`].
    pub async fn handle_transport_state(
        &mut self,
        state: TransportState,
    ) -> Result<(), EngineError> {
        if self.is_closed() {
            debug!("Session {}: {:?} after close", self.id, state);
            return Ok(());
        }

        match state {
            TransportState::Connecting => Ok(()),
            TransportState::Connected => {
                info!("Session {}: media path to {} established", self.id, self.remote);
                Ok(())
            }
            TransportState::Disconnected | TransportState::Failed | TransportState::Closed => {
                warn!("Session {}: transport {:?}", self.id, state);
                self.close().await;
                Err(EngineError::PeerUnreachable)
            }
        }
    }
}
