use crate::media::{LocalMedia, MediaKind, MediaSource};
use crate::negotiation::NegotiationSession;
use crate::orchestrator::{CallCommand, CallPhase, CallState, EndReason};
use crate::signaling::SignalingOutput;
use crate::transport::{PeerConnection, PeerConnector, PeerEvent, SessionId};
use roomcast_core::{Envelope, PeerId, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

pub(crate) struct LoopChannels {
    pub commands: mpsc::Receiver<CallCommand>,
    pub inbound: mpsc::Receiver<Envelope>,
    pub events: mpsc::Receiver<PeerEvent>,
    pub cancel: watch::Receiver<bool>,
}

enum LoopInput {
    Command(CallCommand),
    Inbound(Envelope),
    Peer(PeerEvent),
}

pub(crate) enum Flow {
    Continue,
    Exit(EndReason),
}

/// Single task serializing relay envelopes, UI commands and transport events of one call.
pub(crate) struct CallLoop {
    pub(super) local_id: PeerId,
    pub(super) room_id: RoomId,
    pub(super) connector: Arc<dyn PeerConnector>,
    pub(super) media_source: Arc<dyn MediaSource>,
    pub(super) signaling: Arc<dyn SignalingOutput>,
    pub(super) outbound: mpsc::Sender<Envelope>,
    pub(super) events_tx: mpsc::Sender<PeerEvent>,
    pub(super) state: Arc<watch::Sender<CallState>>,
    /// Room members in join order, as last reported by the relay.
    pub(super) members: Vec<PeerId>,
    pub(super) session: Option<NegotiationSession>,
    /// Capture acquired for a session that is still being opened.
    pub(super) staged_media: Option<Arc<dyn LocalMedia>>,
    /// Connection created for a session that is still being opened.
    pub(super) staged_connection: Option<Box<dyn PeerConnection>>,
    pub(super) next_session: SessionId,
    pub(super) audio_enabled: bool,
    pub(super) video_enabled: bool,
}

impl CallLoop {
    pub async fn run(mut self, mut channels: LoopChannels) {
        info!("Call loop for {} in room {} started", self.local_id, self.room_id);

        let reason = loop {
            let input = tokio::select! {
                biased;
                _ = cancelled(&mut channels.cancel) => break EndReason::Left,
                command = channels.commands.recv() => match command {
                    Some(command) => LoopInput::Command(command),
                    None => break EndReason::Left,
                },
                envelope = channels.inbound.recv() => match envelope {
                    Some(envelope) => LoopInput::Inbound(envelope),
                    None => break EndReason::RelayLost,
                },
                Some(event) = channels.events.recv() => LoopInput::Peer(event),
            };

            // Leaving drops whatever step is in flight.
            let flow = tokio::select! {
                biased;
                _ = cancelled(&mut channels.cancel) => break EndReason::Left,
                flow = self.dispatch(input) => flow,
            };
            if let Flow::Exit(reason) = flow {
                break reason;
            }
        };

        self.shutdown(reason).await;
        info!("Call loop for {} in room {} finished", self.local_id, self.room_id);
    }

    async fn dispatch(&mut self, input: LoopInput) -> Flow {
        match input {
            LoopInput::Command(command) => {
                self.handle_command(command).await;
                Flow::Continue
            }
            LoopInput::Inbound(envelope) => self.handle_envelope(envelope).await,
            LoopInput::Peer(event) => {
                self.handle_peer_event(event).await;
                Flow::Continue
            }
        }
    }

    async fn handle_command(&mut self, command: CallCommand) {
        debug!("Command {:?}", command);
        match command {
            CallCommand::MuteAudio(muted) => {
                self.audio_enabled = !muted;
                self.apply_enabled(MediaKind::Audio, !muted);
            }
            CallCommand::MuteVideo(muted) => {
                self.video_enabled = !muted;
                self.apply_enabled(MediaKind::Video, !muted);
            }
            CallCommand::Retry => self.retry().await,
        }
    }

    fn apply_enabled(&self, kind: MediaKind, enabled: bool) {
        if let Some(media) = self.active_session().and_then(|s| s.media()) {
            media.set_enabled(kind, enabled);
        }
    }

    async fn retry(&mut self) {
        let retryable = matches!(
            &self.state.borrow().phase,
            CallPhase::Ended(reason) if reason.is_retryable()
        );
        if !retryable || self.active_session().is_some() {
            debug!("Nothing to retry");
            return;
        }

        info!("Retrying with a fresh session");
        self.start_session_if_paired().await;
    }

    /// Releases everything the call holds, whatever ended it.
    async fn shutdown(&mut self, reason: EndReason) {
        if let Some(session) = self.session.as_mut() {
            session.close().await;
        }
        self.release_staged().await;
        if reason == EndReason::Left && self.outbound.try_send(Envelope::leave()).is_err() {
            debug!("Relay link already gone; leave not sent");
        }

        info!("Call ended: {}", reason);
        self.publish(CallPhase::Ended(reason), false);
    }

    pub(super) fn publish(&self, phase: CallPhase, remote_media_available: bool) {
        self.state.send_replace(CallState {
            phase,
            remote_media_available,
        });
    }
}

/// Resolves once leaving was requested, or the client went away.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|cancelled| *cancelled).await;
}
