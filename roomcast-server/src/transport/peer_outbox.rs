use roomcast_core::{Envelope, PeerId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Outbound envelope queue of one connected peer.
///
/// Delivery never waits on the receiving socket: a full queue drops the envelope.
#[derive(Debug, Clone)]
pub struct PeerOutbox {
    peer_id: PeerId,
    tx: mpsc::Sender<Envelope>,
}

impl PeerOutbox {
    pub fn channel(peer_id: PeerId, capacity: usize) -> (Self, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { peer_id, tx }, rx)
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn deliver(&self, envelope: Envelope) -> bool {
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(TrySendError::Full(envelope)) => {
                warn!(
                    "Send buffer full for peer {}; dropping {:?} envelope",
                    self.peer_id, envelope.kind
                );
                false
            }
            Err(TrySendError::Closed(envelope)) => {
                debug!(
                    "Outbox of peer {} is closed; dropping {:?} envelope",
                    self.peer_id, envelope.kind
                );
                false
            }
        }
    }
}
