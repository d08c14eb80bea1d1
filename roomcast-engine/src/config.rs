use roomcast_core::{IceServerConfig, PeerId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// WebSocket endpoint of the relay, without the `room`/`peer` query.
    pub relay_url: String,
    /// Identity presented to the relay. A random UUID is used when absent.
    pub peer_id: Option<PeerId>,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            relay_url: "ws://localhost:8888/ws".to_owned(),
            peer_id: None,
            ice_servers: vec![IceServerConfig::default()],
        }
    }
}

impl EngineConfig {
    pub fn resolve_peer_id(&self) -> PeerId {
        self.peer_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(PeerId::random)
    }
}
