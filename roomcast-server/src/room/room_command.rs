use crate::error::RelayError;
use crate::transport::PeerOutbox;
use roomcast_core::{Envelope, PeerId};
use tokio::sync::oneshot;

/// Commands a room actor processes one at a time.
#[derive(Debug)]
pub enum RoomCommand {
    /// Admit a peer. The reply carries the admission result.
    Join {
        peer_id: PeerId,
        outbox: PeerOutbox,
        reply: oneshot::Sender<Result<(), RelayError>>,
    },

    /// Re-send the membership list to a member.
    Snapshot { peer_id: PeerId },

    /// Route a point-to-point envelope; `from` is already stamped.
    Forward { envelope: Envelope },

    /// Socket closed or the peer asked to leave.
    Leave { peer_id: PeerId },

    Members {
        reply: oneshot::Sender<Vec<PeerId>>,
    },
}
