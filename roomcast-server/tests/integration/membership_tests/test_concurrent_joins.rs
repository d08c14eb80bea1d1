use roomcast_core::RoomId;
use roomcast_server::RoomRegistry;

use crate::integration::init_tracing;
use crate::utils::join_registry;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_admit_at_most_two() {
    init_tracing();
    let registry = RoomRegistry::new(2);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            let (result, rx) = join_registry(&registry, "busy", &format!("p{}", i)).await;
            (result.is_ok(), rx)
        }));
    }

    let mut admitted = 0;
    let mut receivers = Vec::new();
    for task in tasks {
        let (ok, rx) = task.await.expect("join task");
        if ok {
            admitted += 1;
        }
        receivers.push(rx);
    }

    assert_eq!(admitted, 2);
    assert_eq!(registry.members(&RoomId::from("busy")).await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rooms_are_independent() {
    init_tracing();
    let registry = RoomRegistry::new(2);

    let mut tasks = Vec::new();
    for i in 0..16 {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            let room = format!("room-{}", i % 8);
            let (result, rx) = join_registry(&registry, &room, &format!("p{}", i)).await;
            (result, rx)
        }));
    }

    let mut receivers = Vec::new();
    for task in tasks {
        let (result, rx) = task.await.expect("join task");
        assert!(result.is_ok());
        receivers.push(rx);
    }

    assert_eq!(registry.room_count(), 8);
}
