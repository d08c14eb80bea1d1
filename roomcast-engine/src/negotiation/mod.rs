mod answer_impl;
mod candidate_impl;
mod close_impl;
mod event_impl;
mod offer_impl;
mod role;

pub use role::*;

use crate::candidate::CandidateBuffer;
use crate::error::EngineError;
use crate::media::LocalMedia;
use crate::signaling::SignalingOutput;
use crate::transport::{PeerConnection, SessionId};
use roomcast_core::{PeerId, SdpType, SessionDescription};
use std::sync::Arc;
use tracing::{error, info};

/// Signaling progress of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingPhase {
    Idle,
    HaveLocalOffer,
    HaveRemoteOffer,
    Stable,
    Closed,
}

/// The offer/answer exchange with one remote peer over one peer connection.
///
/// Owns the connection, the local capture and the candidate buffer; all three are
/// released when the session closes, whatever the cause.
pub struct NegotiationSession {
    id: SessionId,
    role: Role,
    remote: PeerId,
    phase: SignalingPhase,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    candidates: CandidateBuffer,
    connection: Option<Box<dyn PeerConnection>>,
    media: Option<Arc<dyn LocalMedia>>,
    signaling: Arc<dyn SignalingOutput>,
}

impl NegotiationSession {
    /// Wraps an existing connection. Media is expected to be attached already.
    pub fn new(
        id: SessionId,
        role: Role,
        remote: PeerId,
        connection: Box<dyn PeerConnection>,
        media: Arc<dyn LocalMedia>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        info!("Session {} opened as {:?} with {}", id, role, remote);
        Self {
            id,
            role,
            remote,
            phase: SignalingPhase::Idle,
            local_description: None,
            remote_description: None,
            candidates: CandidateBuffer::new(),
            connection: Some(connection),
            media: Some(media),
            signaling,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn remote(&self) -> &PeerId {
        &self.remote
    }

    pub fn phase(&self) -> SignalingPhase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == SignalingPhase::Closed
    }

    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    pub fn buffered_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn media(&self) -> Option<&Arc<dyn LocalMedia>> {
        self.media.as_ref()
    }

    /// Closes the session and reports `reason` as a negotiation failure.
    async fn fail(&mut self, reason: String) -> Result<(), EngineError> {
        error!("Session {} negotiation failed: {}", self.id, reason);
        self.close().await;
        Err(EngineError::NegotiationFailed(reason))
    }
}

/// Rejects descriptions that cannot be applied as `expected`.
pub fn validate_description(
    description: &SessionDescription,
    expected: SdpType,
) -> Result<(), String> {
    if description.kind != expected {
        return Err(format!(
            "expected {} description, got {}",
            expected, description.kind
        ));
    }
    if description.sdp.trim().is_empty() {
        return Err(format!("{} description has an empty SDP", expected));
    }
    Ok(())
}
