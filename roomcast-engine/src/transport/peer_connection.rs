use crate::media::{LocalMedia, MediaKind};
use anyhow::Result;
use async_trait::async_trait;
use roomcast_core::{IceCandidate, SessionDescription};
use tokio::sync::mpsc;

/// Identifies one negotiation session within a call. Events carry it so stale ones can be
/// told apart from the current session's.
pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PeerEventKind {
    LocalCandidate(IceCandidate),
    StateChanged(TransportState),
    RemoteTrack(MediaKind),
    NegotiationNeeded,
}

/// Event raised by a peer connection, tagged with the session that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerEvent {
    pub session: SessionId,
    pub kind: PeerEventKind,
}

/// Anything that can take remote ICE candidates.
#[async_trait]
pub trait CandidateSink: Send + Sync {
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;
}

#[async_trait]
pub trait PeerConnection: CandidateSink {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn attach_media(&self, media: &dyn LocalMedia) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Creates peer connections. Each connection reports its events on `events`.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        session: SessionId,
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Box<dyn PeerConnection>>;
}
