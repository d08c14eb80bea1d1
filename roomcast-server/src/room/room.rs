use crate::error::RelayError;
use crate::room::member::Member;
use crate::room::room_command::RoomCommand;
use crate::room::room_registry::RoomHandle;
use crate::transport::PeerOutbox;
use dashmap::DashMap;
use roomcast_core::{Envelope, ErrorCode, PeerId, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Actor owning the membership of one room.
///
/// Every join, leave and forward for the room runs through `command_rx`, so they are
/// linearized. The actor retires itself when its last member leaves.
pub struct Room {
    room_id: RoomId,
    generation: u64,
    capacity: usize,
    members: Vec<Member>,
    command_rx: mpsc::Receiver<RoomCommand>,
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
}

impl Room {
    pub(crate) fn new(
        room_id: RoomId,
        generation: u64,
        capacity: usize,
        command_rx: mpsc::Receiver<RoomCommand>,
        rooms: Arc<DashMap<RoomId, RoomHandle>>,
    ) -> Self {
        Self {
            room_id,
            generation,
            capacity,
            members: Vec::with_capacity(capacity),
            command_rx,
            rooms,
        }
    }

    pub async fn run(mut self) {
        info!("Room {} event loop started (generation {})", self.room_id, self.generation);

        while let Some(cmd) = self.command_rx.recv().await {
            let membership_changed = matches!(
                cmd,
                RoomCommand::Join { .. } | RoomCommand::Leave { .. }
            );
            self.handle_command(cmd);

            if membership_changed && self.members.is_empty() {
                break;
            }
        }

        self.retire().await;
        info!("Room {} event loop finished", self.room_id);
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                peer_id,
                outbox,
                reply,
            } => {
                let result = self.admit(peer_id, outbox);
                let _ = reply.send(result);
            }

            RoomCommand::Snapshot { peer_id } => {
                let Some(member) = self.member(&peer_id) else {
                    debug!("Snapshot for non-member {} in room {}", peer_id, self.room_id);
                    return;
                };
                member
                    .outbox
                    .deliver(Envelope::join(self.room_id.clone(), self.peer_ids()));
            }

            RoomCommand::Forward { envelope } => self.forward(envelope),

            RoomCommand::Leave { peer_id } => self.remove_peer(&peer_id),

            RoomCommand::Members { reply } => {
                let _ = reply.send(self.peer_ids());
            }
        }
    }

    fn admit(&mut self, peer_id: PeerId, outbox: PeerOutbox) -> Result<(), RelayError> {
        if self.member(&peer_id).is_some() {
            let err = RelayError::PeerIdTaken {
                room_id: self.room_id.clone(),
                peer_id,
            };
            warn!("{}", err);
            outbox.deliver(Envelope::error(
                self.room_id.clone(),
                ErrorCode::PeerIdTaken,
                err.to_string(),
            ));
            return Err(err);
        }

        if self.members.len() >= self.capacity {
            let err = RelayError::CapacityExceeded {
                room_id: self.room_id.clone(),
                capacity: self.capacity,
            };
            warn!("Rejecting peer {}: {}", peer_id, err);
            outbox.deliver(Envelope::error(
                self.room_id.clone(),
                ErrorCode::CapacityExceeded,
                err.to_string(),
            ));
            return Err(err);
        }

        self.members.push(Member::new(peer_id.clone(), outbox));

        let peers = self.peer_ids();
        info!("Peer {} joined room {}; members {:?}", peer_id, self.room_id, peers);

        if let Some(member) = self.member(&peer_id) {
            member
                .outbox
                .deliver(Envelope::join(self.room_id.clone(), peers));
        }
        self.broadcast(
            Envelope::peer_joined(self.room_id.clone(), peer_id.clone()),
            &peer_id,
        );

        Ok(())
    }

    fn forward(&self, envelope: Envelope) {
        let Some(from) = envelope.from.clone() else {
            warn!("Dropping {:?} without sender in room {}", envelope.kind, self.room_id);
            return;
        };
        if self.member(&from).is_none() {
            debug!(
                "Dropping {:?} from non-member {} in room {}",
                envelope.kind, from, self.room_id
            );
            return;
        }

        match envelope.to.clone() {
            Some(to) => match self.member(&to) {
                Some(member) => {
                    trace!("Forwarding {:?} {} -> {}", envelope.kind, from, to);
                    member.outbox.deliver(envelope);
                }
                None => {
                    let err = RelayError::UnknownPeer {
                        room_id: self.room_id.clone(),
                        peer_id: to,
                    };
                    debug!("Dropping {:?} from {}: {}", envelope.kind, from, err);
                }
            },
            None => {
                trace!("Broadcasting {:?} from {}", envelope.kind, from);
                self.broadcast(envelope, &from);
            }
        }
    }

    fn remove_peer(&mut self, peer_id: &PeerId) {
        let Some(index) = self.members.iter().position(|m| &m.peer_id == peer_id) else {
            debug!("Leave for non-member {} in room {}", peer_id, self.room_id);
            return;
        };

        let member = self.members.remove(index);
        info!(
            "Peer {} left room {} after {:?}",
            peer_id,
            self.room_id,
            member.joined_at.elapsed()
        );

        self.broadcast(
            Envelope::peer_left(self.room_id.clone(), peer_id.clone()),
            peer_id,
        );
    }

    async fn retire(&mut self) {
        let generation = self.generation;
        self.rooms
            .remove_if(&self.room_id, |_, handle| handle.generation == generation);
        self.command_rx.close();

        // Commands that raced with the retirement.
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RoomCommand::Join { reply, .. } => {
                    let _ = reply.send(Err(RelayError::RoomClosed(self.room_id.clone())));
                }
                RoomCommand::Members { reply } => {
                    let _ = reply.send(Vec::new());
                }
                other => debug!("Room {} closed; dropping {:?}", self.room_id, other),
            }
        }
        info!("Room {} deleted", self.room_id);
    }

    fn broadcast(&self, envelope: Envelope, except: &PeerId) {
        for member in self.members.iter().filter(|m| &m.peer_id != except) {
            member.outbox.deliver(envelope.clone());
        }
    }

    fn member(&self, peer_id: &PeerId) -> Option<&Member> {
        self.members.iter().find(|m| &m.peer_id == peer_id)
    }

    fn peer_ids(&self) -> Vec<PeerId> {
        self.members.iter().map(|m| m.peer_id.clone()).collect()
    }
}
