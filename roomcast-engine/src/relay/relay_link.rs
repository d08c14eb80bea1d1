use anyhow::Result;
use async_trait::async_trait;
use roomcast_core::{Envelope, PeerId, RoomId};
use tokio::sync::mpsc;

/// A joined relay connection as a pair of envelope channels.
///
/// Dropping `outbound` disconnects; `inbound` ends when the relay goes away.
#[derive(Debug)]
pub struct RelayLink {
    pub outbound: mpsc::Sender<Envelope>,
    pub inbound: mpsc::Receiver<Envelope>,
}

#[async_trait]
pub trait RelayConnector: Send + Sync {
    async fn connect(&self, room_id: &RoomId, peer_id: &PeerId) -> Result<RelayLink>;
}
