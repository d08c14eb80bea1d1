use crate::config::RelayConfig;
use crate::room::RoomRegistry;
use std::sync::Arc;

/// Shared state of the WebSocket endpoint.
#[derive(Clone)]
pub struct SignalingService {
    registry: RoomRegistry,
    config: Arc<RelayConfig>,
}

impl SignalingService {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            registry: RoomRegistry::new(config.room_capacity),
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}
