use anyhow::{Result, bail};
use async_trait::async_trait;
use roomcast_engine::{LocalMedia, MediaKind, MediaSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::utils::Gate;
use webrtc::track::track_local::TrackLocal;

pub struct MockMedia {
    audio: AtomicBool,
    video: AtomicBool,
    released: AtomicBool,
}

impl MockMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            audio: AtomicBool::new(true),
            video: AtomicBool::new(true),
            released: AtomicBool::new(false),
        })
    }
}

impl LocalMedia for MockMedia {
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>> {
        Vec::new()
    }

    fn set_enabled(&self, kind: MediaKind, enabled: bool) {
        match kind {
            MediaKind::Audio => self.audio.store(enabled, Ordering::SeqCst),
            MediaKind::Video => self.video.store(enabled, Ordering::SeqCst),
        }
    }

    fn is_enabled(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.audio.load(Ordering::SeqCst),
            MediaKind::Video => self.video.load(Ordering::SeqCst),
        }
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Media source that remembers every capture it handed out.
#[derive(Default)]
pub struct MockMediaSource {
    acquired: Mutex<Vec<Arc<MockMedia>>>,
    denied: bool,
    gate: Option<Arc<Gate>>,
}

impl MockMediaSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Acquisition always fails, like a user refusing camera access.
    pub fn denied() -> Arc<Self> {
        Arc::new(Self {
            denied: true,
            ..Self::default()
        })
    }

    /// Acquisition stalls until the returned gate opens, like a pending permission prompt.
    pub fn gated() -> (Arc<Self>, Arc<Gate>) {
        let gate = Gate::new();
        let source = Arc::new(Self {
            gate: Some(gate.clone()),
            ..Self::default()
        });
        (source, gate)
    }

    pub fn acquired(&self) -> Vec<Arc<MockMedia>> {
        self.acquired.lock().unwrap().clone()
    }

    pub fn latest(&self) -> Option<Arc<MockMedia>> {
        self.acquired.lock().unwrap().last().cloned()
    }

    pub fn all_released(&self) -> bool {
        self.acquired().iter().all(|m| m.is_released())
    }
}

#[async_trait]
impl MediaSource for MockMediaSource {
    async fn acquire(&self) -> Result<Arc<dyn LocalMedia>> {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if self.denied {
            bail!("camera access denied");
        }
        let media = MockMedia::new();
        self.acquired.lock().unwrap().push(media.clone());
        Ok(media)
    }
}
