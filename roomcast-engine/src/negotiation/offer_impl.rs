use crate::error::EngineError;
use crate::negotiation::{NegotiationSession, Role, SignalingPhase, validate_description};
use roomcast_core::{PeerId, SdpType, SessionDescription};
use tracing::{debug, info, warn};

impl NegotiationSession {
    /// Initiator only: creates an offer, applies it locally and sends it to the remote peer.
    pub async fn start_offer(&mut self) -> Result<(), EngineError> {
        if self.role != Role::Initiator {
            debug!("Session {}: responder does not offer", self.id);
            return Ok(());
        }
        match self.phase {
            SignalingPhase::Idle | SignalingPhase::Stable => {}
            SignalingPhase::Closed => return Err(EngineError::SessionClosed),
            phase => {
                debug!("Session {}: offer already in flight ({:?})", self.id, phase);
                return Ok(());
            }
        }

        let Some(connection) = self.connection.as_deref() else {
            return Err(EngineError::SessionClosed);
        };

        let offer = match connection.create_offer().await {
            Ok(offer) => offer,
            Err(e) => return self.fail(format!("could not create offer: {:#}", e)).await,
        };
        if let Err(e) = connection.set_local_description(offer.clone()).await {
            return self.fail(format!("local offer rejected: {:#}", e)).await;
        }

        self.local_description = Some(offer.clone());
        self.phase = SignalingPhase::HaveLocalOffer;
        info!("Session {}: sending offer to {}", self.id, self.remote);
        self.signaling.send_offer(&self.remote, offer).await;
        Ok(())
    }

    /// Applies the responder's answer to the outstanding offer.
    ///
    /// Answers in any phase but `HaveLocalOffer` are stale and ignored.
    pub async fn handle_answer(
        &mut self,
        from: &PeerId,
        answer: SessionDescription,
    ) -> Result<(), EngineError> {
        if from != &self.remote {
            warn!("Session {}: answer from unexpected peer {}", self.id, from);
            return Ok(());
        }
        if self.phase != SignalingPhase::HaveLocalOffer {
            debug!(
                "Session {}: ignoring stale answer in {:?}",
                self.id, self.phase
            );
            return Ok(());
        }
        if let Err(reason) = validate_description(&answer, SdpType::Answer) {
            return self.fail(reason).await;
        }

        let Some(connection) = self.connection.as_deref() else {
            return Err(EngineError::SessionClosed);
        };
        if let Err(e) = connection.set_remote_description(answer.clone()).await {
            return self.fail(format!("remote answer rejected: {:#}", e)).await;
        }
        self.remote_description = Some(answer);
        self.candidates.flush(connection).await;

        self.phase = SignalingPhase::Stable;
        info!("Session {}: stable", self.id);
        Ok(())
    }

    /// Reacts to the connection asking for a new offer, e.g. after a track was added.
    ///
    /// Only a stable initiator offers again; a responder leaves renegotiation to the initiator.
    pub async fn renegotiate(&mut self) -> Result<(), EngineError> {
        match (self.role, self.phase) {
            (Role::Initiator, SignalingPhase::Stable) => {
                info!("Session {}: renegotiating", self.id);
                self.start_offer().await
            }
            (Role::Responder, _) => {
                debug!("Session {}: deferring renegotiation to initiator", self.id);
                Ok(())
            }
            (Role::Initiator, phase) => {
                debug!("Session {}: renegotiation skipped in {:?}", self.id, phase);
                Ok(())
            }
        }
    }
}
