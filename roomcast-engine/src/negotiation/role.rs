use roomcast_core::PeerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Produces the first offer of every session and drives renegotiation.
    Initiator,
    Responder,
}

/// Decides the local role from the relay's join-ordered membership.
///
/// The first listed member initiates. Both peers see the same order, so exactly one of
/// them initiates. Returns the role and the remote peer, or `None` when `me` has nobody
/// to negotiate with.
pub fn assign_role(members: &[PeerId], me: &PeerId) -> Option<(Role, PeerId)> {
    let [first, second, ..] = members else {
        return None;
    };

    if first == me {
        Some((Role::Initiator, second.clone()))
    } else if second == me {
        Some((Role::Responder, first.clone()))
    } else {
        None
    }
}
