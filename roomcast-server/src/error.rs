use roomcast_core::{PeerId, RoomId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("room {room_id} already holds {capacity} peers")]
    CapacityExceeded { room_id: RoomId, capacity: usize },

    #[error("peer id {peer_id} is already present in room {room_id}")]
    PeerIdTaken { room_id: RoomId, peer_id: PeerId },

    #[error("peer {peer_id} is not a member of room {room_id}")]
    UnknownPeer { room_id: RoomId, peer_id: PeerId },

    /// The room actor retired while the command was queued. The registry retries on a fresh room.
    #[error("room {0} was closed")]
    RoomClosed(RoomId),
}
