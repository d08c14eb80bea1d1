use crate::error::EngineError;
use crate::negotiation::{NegotiationSession, Role, SignalingPhase, validate_description};
use roomcast_core::{PeerId, SdpType, SessionDescription};
use tracing::{info, warn};

impl NegotiationSession {
    /// Responder only: accepts `offer`, flushes buffered candidates and answers the sender.
    ///
    /// Also serves renegotiation offers from a stable initiator.
    pub async fn handle_offer(
        &mut self,
        from: &PeerId,
        offer: SessionDescription,
    ) -> Result<(), EngineError> {
        if self.is_closed() {
            return Err(EngineError::SessionClosed);
        }
        if self.role == Role::Initiator {
            warn!("Session {}: initiator ignores offer from {}", self.id, from);
            return Ok(());
        }
        if from != &self.remote {
            warn!("Session {}: offer from unexpected peer {}", self.id, from);
            return Ok(());
        }
        if let Err(reason) = validate_description(&offer, SdpType::Offer) {
            return self.fail(reason).await;
        }

        let Some(connection) = self.connection.as_deref() else {
            return Err(EngineError::SessionClosed);
        };
        if let Err(e) = connection.set_remote_description(offer.clone()).await {
            return self.fail(format!("remote offer rejected: {:#}", e)).await;
        }
        self.remote_description = Some(offer);
        self.phase = SignalingPhase::HaveRemoteOffer;
        self.candidates.flush(connection).await;

        let answer = match connection.create_answer().await {
            Ok(answer) => answer,
            Err(e) => return self.fail(format!("could not create answer: {:#}", e)).await,
        };
        if let Err(e) = connection.set_local_description(answer.clone()).await {
            return self.fail(format!("local answer rejected: {:#}", e)).await;
        }
        self.local_description = Some(answer.clone());
        self.phase = SignalingPhase::Stable;

        info!("Session {}: answering {}", self.id, from);
        self.signaling.send_answer(from, answer).await;
        Ok(())
    }
}
