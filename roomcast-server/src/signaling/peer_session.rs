use crate::error::RelayError;
use crate::room::RoomRegistry;
use crate::transport::PeerOutbox;
use roomcast_core::{Envelope, EnvelopeKind, PeerId, RoomId};
use tracing::{debug, info, warn};

/// What the connection should do after an inbound envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Leave,
}

/// One admitted peer connection: routes its inbound envelopes into the room.
#[derive(Clone)]
pub struct PeerSession {
    registry: RoomRegistry,
    room_id: RoomId,
    peer_id: PeerId,
    outbox: PeerOutbox,
}

impl PeerSession {
    pub async fn admit(
        registry: RoomRegistry,
        room_id: RoomId,
        peer_id: PeerId,
        outbox: PeerOutbox,
    ) -> Result<Self, RelayError> {
        registry.join(&room_id, &peer_id, &outbox).await?;

        Ok(Self {
            registry,
            room_id,
            peer_id,
            outbox,
        })
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub async fn handle_text(&self, text: &str) -> SessionFlow {
        match Envelope::decode(text) {
            Ok(envelope) => self.handle_envelope(envelope).await,
            Err(e) => {
                warn!("Malformed envelope from peer {}: {}", self.peer_id, e);
                SessionFlow::Continue
            }
        }
    }

    pub async fn handle_envelope(&self, envelope: Envelope) -> SessionFlow {
        let envelope = envelope.stamped(&self.room_id, &self.peer_id);
        debug!(
            "Peer {} in room {} sent {:?}",
            self.peer_id, self.room_id, envelope.kind
        );

        match envelope.kind {
            EnvelopeKind::Join => {
                self.registry.snapshot(&self.room_id, &self.peer_id).await;
            }

            EnvelopeKind::Leave => {
                info!("Peer {} asked to leave room {}", self.peer_id, self.room_id);
                return SessionFlow::Leave;
            }

            EnvelopeKind::Offer | EnvelopeKind::Answer | EnvelopeKind::Candidate => {
                if envelope.payload.is_null() {
                    warn!(
                        "Dropping {:?} without payload from peer {}",
                        envelope.kind, self.peer_id
                    );
                } else {
                    self.registry.forward(&self.room_id, envelope).await;
                }
            }

            EnvelopeKind::Message => {
                self.registry.forward(&self.room_id, envelope).await;
            }

            EnvelopeKind::Ping => {
                self.outbox.deliver(Envelope::pong(self.room_id.clone()));
            }

            EnvelopeKind::PeerJoined
            | EnvelopeKind::PeerLeft
            | EnvelopeKind::Pong
            | EnvelopeKind::Error => {
                warn!(
                    "Peer {} sent relay-only {:?} envelope; ignoring",
                    self.peer_id, envelope.kind
                );
            }
        }

        SessionFlow::Continue
    }

    /// Removes the peer from its room. Safe to call more than once.
    pub async fn close(&self) {
        self.registry.leave(&self.room_id, &self.peer_id).await;
    }
}
