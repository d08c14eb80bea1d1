use crate::orchestrator::call_loop::CallLoop;
use crate::transport::{PeerEvent, PeerEventKind};
use tracing::{info, trace};

impl CallLoop {
    pub(super) async fn handle_peer_event(&mut self, event: PeerEvent) {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.id() == event.session && !s.is_closed())
        else {
            trace!("Discarding {:?} from stale session {}", event.kind, event.session);
            return;
        };

        match event.kind {
            PeerEventKind::LocalCandidate(candidate) => {
                session.send_local_candidate(candidate).await;
            }
            PeerEventKind::StateChanged(state) => {
                let result = session.handle_transport_state(state).await;
                self.settle(result).await;
            }
            PeerEventKind::RemoteTrack(kind) => {
                info!("Remote {} available", kind);
                self.state.send_if_modified(|state| {
                    let changed = !state.remote_media_available;
                    state.remote_media_available = true;
                    changed
                });
            }
            PeerEventKind::NegotiationNeeded => {
                let result = session.renegotiate().await;
                self.settle(result).await;
            }
        }
    }
}
