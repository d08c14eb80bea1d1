use crate::transport::PeerOutbox;
use roomcast_core::PeerId;
use tokio::time::Instant;

pub(crate) struct Member {
    pub peer_id: PeerId,
    pub outbox: PeerOutbox,
    pub joined_at: Instant,
}

impl Member {
    pub fn new(peer_id: PeerId, outbox: PeerOutbox) -> Self {
        Self {
            peer_id,
            outbox,
            joined_at: Instant::now(),
        }
    }
}
