use crate::error::EngineError;
use crate::media::MediaKind;
use crate::negotiation::{NegotiationSession, Role, SignalingPhase, assign_role};
use crate::orchestrator::call_loop::CallLoop;
use crate::orchestrator::{CallPhase, EndReason};
use roomcast_core::PeerId;
use tracing::{error, info, warn};

impl CallLoop {
    pub(super) fn active_session(&self) -> Option<&NegotiationSession> {
        self.session.as_ref().filter(|s| !s.is_closed())
    }

    pub(super) fn active_session_mut(&mut self) -> Option<&mut NegotiationSession> {
        self.session.as_mut().filter(|s| !s.is_closed())
    }

    /// Opens a session when the membership pairs us with a remote peer.
    pub(super) async fn start_session_if_paired(&mut self) {
        if self.active_session().is_some() {
            return;
        }

        match assign_role(&self.members, &self.local_id) {
            Some((role, remote)) => self.open_session(role, remote).await,
            None => {
                if !self.state.borrow().is_ended() {
                    self.publish(CallPhase::Waiting, false);
                }
            }
        }
    }

    pub(super) async fn open_session(&mut self, role: Role, remote: PeerId) {
        if let Some(mut previous) = self.session.take() {
            previous.close().await;
        }
        let id = self.next_session;
        self.next_session += 1;
        info!("Opening session {} as {:?} with {}", id, role, remote);
        self.publish(CallPhase::Connecting, false);

        let media = match self.media_source.acquire().await {
            Ok(media) => media,
            Err(e) => {
                error!("Could not acquire local media: {:#}", e);
                self.publish(
                    CallPhase::Ended(EndReason::MediaUnavailable(format!("{:#}", e))),
                    false,
                );
                return;
            }
        };
        media.set_enabled(MediaKind::Audio, self.audio_enabled);
        media.set_enabled(MediaKind::Video, self.video_enabled);
        self.staged_media = Some(media.clone());

        let connection = match self.connector.connect(id, self.events_tx.clone()).await {
            Ok(connection) => connection,
            Err(e) => {
                error!("Session {}: peer connection unavailable: {:#}", id, e);
                self.release_staged().await;
                let reason = format!("peer connection unavailable: {:#}", e);
                self.settle(Err(EngineError::NegotiationFailed(reason))).await;
                return;
            }
        };
        let connection = self.staged_connection.insert(connection);
        let attached = connection.attach_media(media.as_ref()).await;

        if let Err(e) = attached {
            error!("Session {}: could not attach local media: {:#}", id, e);
            self.release_staged().await;
            let reason = format!("could not attach local media: {:#}", e);
            self.settle(Err(EngineError::NegotiationFailed(reason))).await;
            return;
        }

        let (Some(connection), Some(media)) =
            (self.staged_connection.take(), self.staged_media.take())
        else {
            return;
        };
        let session =
            NegotiationSession::new(id, role, remote, connection, media, self.signaling.clone());
        let session = self.session.insert(session);

        if role == Role::Initiator {
            let result = session.start_offer().await;
            self.settle(result).await;
        }
    }

    /// Closes the connection and releases the capture of a session that never finished opening.
    pub(super) async fn release_staged(&mut self) {
        if let Some(connection) = self.staged_connection.take() {
            if let Err(e) = connection.close().await {
                warn!("Closing unopened peer connection failed: {:#}", e);
            }
        }
        if let Some(media) = self.staged_media.take() {
            media.release();
        }
    }

    /// Maps the outcome of a session step onto the call state.
    pub(super) async fn settle(&mut self, result: Result<(), EngineError>) {
        match result {
            Ok(()) => self.publish_session_phase(),
            Err(EngineError::NegotiationFailed(reason)) => {
                self.end_session(EndReason::NegotiationFailed(reason)).await
            }
            Err(EngineError::PeerUnreachable) => self.end_session(EndReason::PeerUnreachable).await,
            Err(e) => warn!("Session step failed: {}", e),
        }
    }

    pub(super) async fn end_session(&mut self, reason: EndReason) {
        if let Some(session) = self.session.as_mut() {
            session.close().await;
        }
        info!("Session ended: {}", reason);
        self.publish(CallPhase::Ended(reason), false);
    }

    fn publish_session_phase(&self) {
        let Some(session) = self.active_session() else {
            return;
        };
        let phase = match session.phase() {
            SignalingPhase::Stable => CallPhase::Connected,
            _ => CallPhase::Connecting,
        };
        self.state.send_if_modified(|state| {
            if state.phase == phase {
                return false;
            }
            state.phase = phase;
            true
        });
    }
}
