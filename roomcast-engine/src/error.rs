use roomcast_core::RoomId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A description was structurally invalid or rejected by the connection. Never retried.
    #[error("negotiation failed: {0}")]
    NegotiationFailed(String),

    #[error("remote peer is unreachable")]
    PeerUnreachable,

    #[error("relay unavailable: {0}")]
    RelayUnavailable(String),

    #[error("local media unavailable: {0}")]
    MediaUnavailable(String),

    #[error("already joined room {0}")]
    AlreadyJoined(RoomId),

    #[error("not joined to a room")]
    NotJoined,

    #[error("negotiation session is closed")]
    SessionClosed,
}
