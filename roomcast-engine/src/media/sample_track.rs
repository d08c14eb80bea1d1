use crate::media::{LocalMedia, MediaKind, MediaSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const STREAM_ID: &str = "roomcast";
const AUDIO_FRAME: Duration = Duration::from_millis(20);
/// Opus frame that decodes to silence.
static OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];
const VIDEO_FRAME_LEN: usize = 160;

/// Opus audio plus VP8 video tracks fed with encoded samples by the caller.
pub struct SampleTrackMedia {
    audio: Arc<TrackLocalStaticSample>,
    video: Arc<TrackLocalStaticSample>,
    audio_enabled: AtomicBool,
    video_enabled: AtomicBool,
    released: AtomicBool,
}

impl SampleTrackMedia {
    pub fn new() -> Self {
        let audio = TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48_000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            STREAM_ID.to_owned(),
        );
        let video = TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90_000,
                ..Default::default()
            },
            "video".to_owned(),
            STREAM_ID.to_owned(),
        );

        Self {
            audio: Arc::new(audio),
            video: Arc::new(video),
            audio_enabled: AtomicBool::new(true),
            video_enabled: AtomicBool::new(true),
            released: AtomicBool::new(false),
        }
    }

    /// Writes one encoded sample. Returns `false` when the track is muted or released.
    pub async fn write_sample(&self, kind: MediaKind, sample: &Sample) -> Result<bool> {
        if self.is_released() || !self.is_enabled(kind) {
            return Ok(false);
        }

        let track = match kind {
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        };
        track
            .write_sample(sample)
            .await
            .with_context(|| format!("failed to write {} sample", kind))?;
        Ok(true)
    }

    /// Feeds silence and placeholder frames until the capture is released.
    pub fn spawn_synthetic_feed(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(AUDIO_FRAME);
            let mut tick: u64 = 0;
            let video_frame = Bytes::from(vec![0u8; VIDEO_FRAME_LEN]);

            while !self.is_released() {
                ticker.tick().await;
                tick += 1;

                let audio = Sample {
                    data: Bytes::from_static(&OPUS_SILENCE),
                    duration: AUDIO_FRAME,
                    ..Default::default()
                };
                if let Err(e) = self.write_sample(MediaKind::Audio, &audio).await {
                    debug!("Synthetic audio sample dropped: {:#}", e);
                }

                if tick % 2 == 0 {
                    let video = Sample {
                        data: video_frame.clone(),
                        duration: AUDIO_FRAME * 2,
                        ..Default::default()
                    };
                    if let Err(e) = self.write_sample(MediaKind::Video, &video).await {
                        debug!("Synthetic video sample dropped: {:#}", e);
                    }
                }
            }
            debug!("Synthetic feed stopped");
        });
    }

    fn flag(&self, kind: MediaKind) -> &AtomicBool {
        match kind {
            MediaKind::Audio => &self.audio_enabled,
            MediaKind::Video => &self.video_enabled,
        }
    }
}

impl Default for SampleTrackMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalMedia for SampleTrackMedia {
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>> {
        vec![
            Arc::clone(&self.audio) as Arc<dyn TrackLocal + Send + Sync>,
            Arc::clone(&self.video) as Arc<dyn TrackLocal + Send + Sync>,
        ]
    }

    fn set_enabled(&self, kind: MediaKind, enabled: bool) {
        self.flag(kind).store(enabled, Ordering::SeqCst);
        debug!("Local {} {}", kind, if enabled { "unmuted" } else { "muted" });
    }

    fn is_enabled(&self, kind: MediaKind) -> bool {
        self.flag(kind).load(Ordering::SeqCst)
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            info!("Local media released");
        }
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Hands out [`SampleTrackMedia`] captures, optionally driven by a synthetic feed.
#[derive(Debug, Clone, Default)]
pub struct SampleTrackSource {
    synthetic_feed: bool,
}

impl SampleTrackSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synthetic_feed(mut self) -> Self {
        self.synthetic_feed = true;
        self
    }
}

#[async_trait]
impl MediaSource for SampleTrackSource {
    async fn acquire(&self) -> Result<Arc<dyn LocalMedia>> {
        let media = Arc::new(SampleTrackMedia::new());
        if self.synthetic_feed {
            Arc::clone(&media).spawn_synthetic_feed();
        }
        Ok(media)
    }
}
