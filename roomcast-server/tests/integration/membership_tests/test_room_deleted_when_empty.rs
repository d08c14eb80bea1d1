use roomcast_core::{PeerId, RoomId};
use roomcast_server::RoomRegistry;

use crate::integration::init_tracing;
use crate::utils::{ids, join_registry, wait_until};

#[tokio::test]
async fn test_room_deleted_when_empty() {
    init_tracing();
    let registry = RoomRegistry::new(2);
    let room = RoomId::from("r");

    let (_, _a_rx) = join_registry(&registry, "r", "a").await;
    let (_, _b_rx) = join_registry(&registry, "r", "b").await;
    assert_eq!(registry.room_count(), 1);

    registry.leave(&room, &PeerId::from("a")).await;
    registry.leave(&room, &PeerId::from("b")).await;

    let (registry_ref, room_ref) = (&registry, &room);
    let gone = wait_until(1000, move || async move { !registry_ref.contains_room(room_ref) }).await;
    assert!(gone, "empty room should be deleted");
    assert!(registry.members(&room).await.is_empty());

    // A later join creates a fresh room.
    let (result, _c_rx) = join_registry(&registry, "r", "c").await;
    assert!(result.is_ok());
    assert_eq!(registry.members(&room).await, ids(&["c"]));
}

#[tokio::test]
async fn test_join_racing_room_deletion_is_retried() {
    init_tracing();
    let registry = RoomRegistry::new(2);
    let room = RoomId::from("churn");

    for round in 0..50 {
        let peer = format!("p{}", round);
        let (result, _rx) = join_registry(&registry, "churn", &peer).await;
        assert!(result.is_ok(), "round {} failed: {:?}", round, result);

        let leaver = registry.clone();
        let leave_room = room.clone();
        let leave_peer = PeerId::from(peer.as_str());
        let leave = tokio::spawn(async move { leaver.leave(&leave_room, &leave_peer).await });

        let (next, _next_rx) = join_registry(&registry, "churn", "next").await;
        assert!(next.is_ok(), "round {} rejoin failed: {:?}", round, next);
        leave.await.expect("leave task");

        registry.leave(&room, &PeerId::from("next")).await;
    }
}
