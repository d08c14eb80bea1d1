use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// A local capture: the tracks sent to the remote peer.
///
/// `release` stops the capture for good; a released capture never produces samples again.
pub trait LocalMedia: Send + Sync {
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>>;

    fn set_enabled(&self, kind: MediaKind, enabled: bool);

    fn is_enabled(&self, kind: MediaKind) -> bool;

    fn release(&self);

    fn is_released(&self) -> bool;
}

#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<Arc<dyn LocalMedia>>;
}
