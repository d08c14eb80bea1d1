mod call_command;
mod call_loop;
mod call_state;
mod inbound_impl;
mod peer_event_impl;
mod session_impl;

pub use call_command::CallCommand;
pub use call_state::*;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::media::{MediaSource, SampleTrackSource};
use crate::relay::{RelayConnector, WsRelayConnector};
use crate::signaling::RelaySignaling;
use crate::transport::{PeerConnector, WebRtcConnector};
use call_loop::{CallLoop, LoopChannels};
use roomcast_core::{PeerId, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const COMMAND_CAPACITY: usize = 16;
const PEER_EVENT_CAPACITY: usize = 64;

struct ActiveCall {
    room_id: RoomId,
    commands: mpsc::Sender<CallCommand>,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Joins one room at a time and drives the call with whoever else is in it.
///
/// State changes are published on a watch channel; see [`CallClient::subscribe`].
pub struct CallClient {
    local_id: PeerId,
    relay: Arc<dyn RelayConnector>,
    connector: Arc<dyn PeerConnector>,
    media_source: Arc<dyn MediaSource>,
    state: Arc<watch::Sender<CallState>>,
    active: Option<ActiveCall>,
}

impl CallClient {
    pub fn new(
        config: &EngineConfig,
        relay: Arc<dyn RelayConnector>,
        connector: Arc<dyn PeerConnector>,
        media_source: Arc<dyn MediaSource>,
    ) -> Self {
        let (state, _) = watch::channel(CallState::default());
        Self {
            local_id: config.resolve_peer_id(),
            relay,
            connector,
            media_source,
            state: Arc::new(state),
            active: None,
        }
    }

    /// Client over the WebSocket relay and webrtc-rs, sending synthetic media.
    pub fn with_webrtc(config: &EngineConfig) -> Self {
        Self::new(
            config,
            Arc::new(WsRelayConnector::new(config.relay_url.clone())),
            Arc::new(WebRtcConnector::from_config(config)),
            Arc::new(SampleTrackSource::new().with_synthetic_feed()),
        )
    }

    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.active.as_ref().map(|call| &call.room_id)
    }

    pub fn state(&self) -> CallState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CallState> {
        self.state.subscribe()
    }

    /// Connects to the relay and starts the call loop for `room_id`.
    pub async fn join(&mut self, room_id: RoomId) -> Result<(), EngineError> {
        if let Some(call) = &self.active {
            if !call.task.is_finished() {
                return Err(EngineError::AlreadyJoined(call.room_id.clone()));
            }
        }
        self.active = None;

        let link = match self.relay.connect(&room_id, &self.local_id).await {
            Ok(link) => link,
            Err(e) => {
                error!("Relay unavailable: {:#}", e);
                self.state.send_replace(CallState {
                    phase: CallPhase::Ended(EndReason::RelayLost),
                    remote_media_available: false,
                });
                return Err(EngineError::RelayUnavailable(format!("{:#}", e)));
            }
        };
        info!("{} joining room {}", self.local_id, room_id);
        self.state.send_replace(CallState::default());

        let (commands_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let (events_tx, events) = mpsc::channel(PEER_EVENT_CAPACITY);
        let (cancel_tx, cancel) = watch::channel(false);

        let signaling = Arc::new(RelaySignaling::new(
            self.local_id.clone(),
            link.outbound.clone(),
        ));
        let call_loop = CallLoop {
            local_id: self.local_id.clone(),
            room_id: room_id.clone(),
            connector: self.connector.clone(),
            media_source: self.media_source.clone(),
            signaling,
            outbound: link.outbound,
            events_tx,
            state: self.state.clone(),
            members: Vec::new(),
            session: None,
            staged_media: None,
            staged_connection: None,
            next_session: 1,
            audio_enabled: true,
            video_enabled: true,
        };
        let channels = LoopChannels {
            commands,
            inbound: link.inbound,
            events,
            cancel,
        };
        let task = tokio::spawn(call_loop.run(channels));

        self.active = Some(ActiveCall {
            room_id,
            commands: commands_tx,
            cancel: cancel_tx,
            task,
        });
        Ok(())
    }

    /// Leaves the room, interrupting any negotiation step in flight, and waits
    /// until the session and local media are released.
    pub async fn leave(&mut self) -> Result<(), EngineError> {
        let call = self.active.take().ok_or(EngineError::NotJoined)?;
        call.cancel.send_replace(true);
        if let Err(e) = call.task.await {
            warn!("Call loop for room {} aborted: {}", call.room_id, e);
        }
        Ok(())
    }

    pub async fn mute_audio(&self, muted: bool) -> Result<(), EngineError> {
        self.command(CallCommand::MuteAudio(muted)).await
    }

    pub async fn mute_video(&self, muted: bool) -> Result<(), EngineError> {
        self.command(CallCommand::MuteVideo(muted)).await
    }

    /// Starts a fresh session after a retryable failure. Does nothing otherwise.
    pub async fn retry(&self) -> Result<(), EngineError> {
        self.command(CallCommand::Retry).await
    }

    async fn command(&self, command: CallCommand) -> Result<(), EngineError> {
        let call = self.active.as_ref().ok_or(EngineError::NotJoined)?;
        call.commands
            .send(command)
            .await
            .map_err(|_| EngineError::SessionClosed)
    }
}

impl Drop for CallClient {
    fn drop(&mut self) {
        if let Some(call) = &self.active {
            call.cancel.send_replace(true);
        }
    }
}
