use roomcast_core::{PeerId, RoomId};
use roomcast_engine::{CallClient, CallPhase, CallState, EngineConfig, RelayConnector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::utils::{MockConnector, MockMediaSource};

/// A call client over mocks, with handles on everything it drives.
pub struct TestPeer {
    pub client: CallClient,
    pub connector: Arc<MockConnector>,
    pub media: Arc<MockMediaSource>,
    pub states: watch::Receiver<CallState>,
}

impl TestPeer {
    pub fn new(relay: Arc<dyn RelayConnector>, id: &str) -> Self {
        Self::with_parts(relay, id, MockConnector::new(), MockMediaSource::new())
    }

    pub fn with_parts(
        relay: Arc<dyn RelayConnector>,
        id: &str,
        connector: Arc<MockConnector>,
        media: Arc<MockMediaSource>,
    ) -> Self {
        let config = EngineConfig {
            peer_id: Some(PeerId::from(id)),
            ..EngineConfig::default()
        };
        let client = CallClient::new(&config, relay, connector.clone(), media.clone());
        let states = client.subscribe();
        Self {
            client,
            connector,
            media,
            states,
        }
    }

    pub fn id(&self) -> PeerId {
        self.client.local_id().clone()
    }

    pub async fn join(&mut self, room: &str) {
        self.client
            .join(RoomId::from(room))
            .await
            .expect("join failed");
    }

    pub async fn wait_for_phase(&mut self, phase: CallPhase) -> bool {
        wait_for_state(&mut self.states, |state| state.phase == phase).await
    }
}

/// Waits up to two seconds for the published state to satisfy `check`.
pub async fn wait_for_state<F>(states: &mut watch::Receiver<CallState>, check: F) -> bool
where
    F: FnMut(&CallState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), states.wait_for(check))
        .await
        .is_ok_and(|result| result.is_ok())
}

/// Polls until `check` holds or `timeout_ms` elapses.
pub async fn wait_until<F>(timeout_ms: u64, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Both peers joined `room` and reached `Connected`.
pub async fn connected_pair(
    relay: Arc<dyn RelayConnector>,
    room: &str,
) -> (TestPeer, TestPeer) {
    let mut a = TestPeer::new(relay.clone(), "a");
    let mut b = TestPeer::new(relay, "b");

    a.join(room).await;
    assert!(a.wait_for_phase(CallPhase::Waiting).await, "a should wait");
    b.join(room).await;

    assert!(a.wait_for_phase(CallPhase::Connected).await, "a should connect");
    assert!(b.wait_for_phase(CallPhase::Connected).await, "b should connect");
    (a, b)
}
