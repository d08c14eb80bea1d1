use crate::error::RelayError;
use crate::room::room::Room;
use crate::room::room_command::RoomCommand;
use crate::transport::PeerOutbox;
use dashmap::DashMap;
use roomcast_core::{Envelope, PeerId, RoomId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

const ROOM_QUEUE_CAPACITY: usize = 256;

#[derive(Clone)]
pub(crate) struct RoomHandle {
    pub generation: u64,
    pub sender: mpsc::Sender<RoomCommand>,
}

/// Map from room id to the actor owning that room.
///
/// Rooms are spawned on first join and remove themselves once empty.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    capacity: usize,
    next_generation: Arc<AtomicU64>,
}

impl RoomRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            capacity,
            next_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Admits `peer_id` into `room_id`, creating the room if needed.
    ///
    /// The room answers on `outbox` as well: a `join` envelope on success, an `error`
    /// envelope on rejection.
    pub async fn join(
        &self,
        room_id: &RoomId,
        peer_id: &PeerId,
        outbox: &PeerOutbox,
    ) -> Result<(), RelayError> {
        loop {
            let handle = self.get_or_spawn(room_id);
            let (reply, response) = oneshot::channel();
            let cmd = RoomCommand::Join {
                peer_id: peer_id.clone(),
                outbox: outbox.clone(),
                reply,
            };

            if handle.sender.send(cmd).await.is_err() {
                self.discard(room_id, handle.generation);
                continue;
            }

            match response.await {
                Ok(Err(RelayError::RoomClosed(_))) | Err(_) => {
                    debug!("Room {} closed during join of {}; retrying", room_id, peer_id);
                    self.discard(room_id, handle.generation);
                }
                Ok(result) => return result,
            }
        }
    }

    pub async fn forward(&self, room_id: &RoomId, envelope: Envelope) {
        self.send(room_id, RoomCommand::Forward { envelope }).await;
    }

    pub async fn leave(&self, room_id: &RoomId, peer_id: &PeerId) {
        self.send(
            room_id,
            RoomCommand::Leave {
                peer_id: peer_id.clone(),
            },
        )
        .await;
    }

    pub async fn snapshot(&self, room_id: &RoomId, peer_id: &PeerId) {
        self.send(
            room_id,
            RoomCommand::Snapshot {
                peer_id: peer_id.clone(),
            },
        )
        .await;
    }

    /// Current members of a room in join order. Empty when the room does not exist.
    pub async fn members(&self, room_id: &RoomId) -> Vec<PeerId> {
        let Some(handle) = self.get(room_id) else {
            return Vec::new();
        };
        let (reply, response) = oneshot::channel();
        if handle.sender.send(RoomCommand::Members { reply }).await.is_err() {
            return Vec::new();
        }
        response.await.unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    async fn send(&self, room_id: &RoomId, cmd: RoomCommand) {
        let Some(handle) = self.get(room_id) else {
            debug!("No room {}; dropping {:?}", room_id, cmd);
            return;
        };
        if let Err(e) = handle.sender.send(cmd).await {
            debug!("Room {} is gone; dropping {:?}", room_id, e.0);
        }
    }

    fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    fn get_or_spawn(&self, room_id: &RoomId) -> RoomHandle {
        if let Some(handle) = self.get(room_id) {
            return handle;
        }

        self.rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let (sender, command_rx) = mpsc::channel(ROOM_QUEUE_CAPACITY);
                let room = Room::new(
                    room_id.clone(),
                    generation,
                    self.capacity,
                    command_rx,
                    self.rooms.clone(),
                );
                tokio::spawn(room.run());
                info!("Created room {}", room_id);

                RoomHandle { generation, sender }
            })
            .value()
            .clone()
    }

    fn discard(&self, room_id: &RoomId, generation: u64) {
        self.rooms
            .remove_if(room_id, |_, handle| handle.generation == generation);
    }
}
