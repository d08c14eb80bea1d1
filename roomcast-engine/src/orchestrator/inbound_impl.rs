use crate::negotiation::{Role, assign_role};
use crate::orchestrator::EndReason;
use crate::orchestrator::call_loop::{CallLoop, Flow};
use roomcast_core::{Envelope, ErrorCode, PeerId, SessionDescription, Signal};
use tracing::{debug, info, trace, warn};

impl CallLoop {
    pub(super) async fn handle_envelope(&mut self, envelope: Envelope) -> Flow {
        let signal = match envelope.signal() {
            Ok(signal) => signal,
            Err(e) => {
                warn!("Ignoring malformed {:?} envelope: {}", envelope.kind, e);
                return Flow::Continue;
            }
        };

        match signal {
            Signal::Join(payload) => {
                info!("Room {} members: {:?}", self.room_id, payload.peers);
                self.members = payload.peers;
                self.start_session_if_paired().await;
            }

            Signal::PeerJoined { peer } => {
                info!("Peer {} joined room {}", peer, self.room_id);
                if peer != self.local_id && !self.members.contains(&peer) {
                    self.members.push(peer);
                }
                self.start_session_if_paired().await;
            }

            Signal::PeerLeft { peer } => self.handle_peer_left(peer).await,

            Signal::Offer { from, description } => self.handle_offer(from, description).await,

            Signal::Answer { from, description } => match self.active_session_mut() {
                Some(session) => {
                    let result = session.handle_answer(&from, description).await;
                    self.settle(result).await;
                }
                None => debug!("Answer from {} without an active session", from),
            },

            Signal::Candidate { from, candidate } => match self.active_session_mut() {
                Some(session) => session.handle_candidate(&from, candidate).await,
                None => debug!("Candidate from {} without an active session", from),
            },

            Signal::Message { from, data } => {
                debug!("Ignoring application message from {:?}: {}", from, data);
            }

            Signal::Error(payload) => {
                warn!("Relay refused to admit {}: {}", self.local_id, payload.message);
                let reason = match payload.code {
                    ErrorCode::CapacityExceeded => EndReason::RoomFull,
                    ErrorCode::PeerIdTaken => EndReason::PeerIdTaken,
                };
                return Flow::Exit(reason);
            }

            Signal::Ping | Signal::Pong | Signal::Leave => {
                trace!("Ignoring {:?} from relay", envelope.kind);
            }
        }

        Flow::Continue
    }

    async fn handle_peer_left(&mut self, peer: PeerId) {
        info!("Peer {} left room {}", peer, self.room_id);
        self.members.retain(|member| member != &peer);

        let was_remote = self
            .session
            .as_ref()
            .is_some_and(|session| session.remote() == &peer);
        if was_remote {
            self.end_session(EndReason::RemoteLeft).await;
        }
    }

    async fn handle_offer(&mut self, from: PeerId, description: SessionDescription) {
        if self.active_session().is_none() {
            // A closed responder takes a fresh offer as a new session.
            match assign_role(&self.members, &self.local_id) {
                Some((Role::Responder, remote)) if remote == from => {
                    self.open_session(Role::Responder, remote).await;
                }
                _ => {
                    warn!("Ignoring offer from {}: no session can take it", from);
                    return;
                }
            }
        }

        if let Some(session) = self.active_session_mut() {
            let result = session.handle_offer(&from, description).await;
            self.settle(result).await;
        }
    }
}
