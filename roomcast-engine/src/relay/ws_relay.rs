use crate::relay::{RelayConnector, RelayLink};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use roomcast_core::{Envelope, PeerId, RoomId};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

const LINK_CAPACITY: usize = 64;

/// Connects to the relay's `/ws` endpoint over WebSocket.
#[derive(Debug, Clone)]
pub struct WsRelayConnector {
    relay_url: String,
}

impl WsRelayConnector {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
        }
    }

    fn endpoint(&self, room_id: &RoomId, peer_id: &PeerId) -> Result<Url> {
        let mut url = Url::parse(&self.relay_url)
            .with_context(|| format!("invalid relay url {}", self.relay_url))?;
        url.query_pairs_mut()
            .append_pair("room", room_id.as_str())
            .append_pair("peer", peer_id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl RelayConnector for WsRelayConnector {
    async fn connect(&self, room_id: &RoomId, peer_id: &PeerId) -> Result<RelayLink> {
        let url = self.endpoint(room_id, peer_id)?;
        let (stream, _) = connect_async(url.as_str())
            .await
            .with_context(|| format!("failed to connect to relay at {}", self.relay_url))?;
        info!("Connected to relay {} as {} in room {}", self.relay_url, peer_id, room_id);

        let (mut sink, mut source) = stream.split();
        let (outbound, mut outbound_rx) = mpsc::channel::<Envelope>(LINK_CAPACITY);
        let (inbound_tx, inbound) = mpsc::channel::<Envelope>(LINK_CAPACITY);

        tokio::spawn(async move {
            while let Some(envelope) = outbound_rx.recv().await {
                let text = match envelope.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode {:?} envelope: {}", envelope.kind, e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    warn!("Relay write failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
            debug!("Relay writer stopped");
        });

        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => match Envelope::decode(text.as_str()) {
                        Ok(envelope) => {
                            if inbound_tx.send(envelope).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Malformed envelope from relay: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay read failed: {}", e);
                        break;
                    }
                }
            }
            debug!("Relay reader stopped");
        });

        Ok(RelayLink { outbound, inbound })
    }
}
