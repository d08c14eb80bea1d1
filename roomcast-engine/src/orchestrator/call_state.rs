use std::fmt;

/// Why a call, or the session inside it, ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    Left,
    RemoteLeft,
    NegotiationFailed(String),
    PeerUnreachable,
    RoomFull,
    PeerIdTaken,
    RelayLost,
    MediaUnavailable(String),
}

impl EndReason {
    /// Whether [`crate::CallClient::retry`] may start a new session.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EndReason::NegotiationFailed(_)
                | EndReason::PeerUnreachable
                | EndReason::MediaUnavailable(_)
        )
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Left => write!(f, "left the room"),
            EndReason::RemoteLeft => write!(f, "remote peer left"),
            EndReason::NegotiationFailed(reason) => write!(f, "negotiation failed: {}", reason),
            EndReason::PeerUnreachable => write!(f, "remote peer unreachable"),
            EndReason::RoomFull => write!(f, "room is full"),
            EndReason::PeerIdTaken => write!(f, "peer id already in use"),
            EndReason::RelayLost => write!(f, "lost connection to relay"),
            EndReason::MediaUnavailable(reason) => write!(f, "media unavailable: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallPhase {
    /// Not joined.
    #[default]
    Idle,
    /// Joined, alone in the room.
    Waiting,
    Connecting,
    /// Signaling reached a stable offer/answer pair.
    Connected,
    Ended(EndReason),
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallPhase::Idle => write!(f, "idle"),
            CallPhase::Waiting => write!(f, "waiting for a peer"),
            CallPhase::Connecting => write!(f, "connecting"),
            CallPhase::Connected => write!(f, "connected"),
            CallPhase::Ended(reason) => write!(f, "ended ({})", reason),
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallState {
    pub phase: CallPhase,
    pub remote_media_available: bool,
}

impl CallState {
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, CallPhase::Ended(_))
    }
}
