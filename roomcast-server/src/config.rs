use std::net::SocketAddr;
use std::time::Duration;

use roomcast_core::utils::ROOM_CAPACITY;

/// Relay settings. Defaults match the public deployment: port 8888, pairwise rooms.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub listen_addr: SocketAddr,
    pub room_capacity: usize,
    /// Envelopes queued per peer before new ones are dropped.
    pub outbox_capacity: usize,
    pub ping_interval: Duration,
    pub idle_timeout: Duration,
    pub max_message_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8888)),
            room_capacity: ROOM_CAPACITY,
            outbox_capacity: 256,
            ping_interval: Duration::from_secs(25),
            idle_timeout: Duration::from_secs(60),
            max_message_size: 1 << 20,
        }
    }
}
