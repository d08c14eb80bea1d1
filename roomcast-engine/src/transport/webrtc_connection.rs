use crate::config::EngineConfig;
use crate::media::{LocalMedia, MediaKind};
use crate::transport::{
    CandidateSink, PeerConnection, PeerConnector, PeerEvent, PeerEventKind, SessionId,
    TransportState,
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use roomcast_core::{IceCandidate, IceServerConfig, SdpType, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;

/// Builds [`WebRtcConnection`]s against a fixed ICE server list.
#[derive(Debug, Clone)]
pub struct WebRtcConnector {
    ice_servers: Vec<IceServerConfig>,
}

impl WebRtcConnector {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.ice_servers.clone())
    }
}

#[async_trait]
impl PeerConnector for WebRtcConnector {
    async fn connect(
        &self,
        session: SessionId,
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Box<dyn PeerConnection>> {
        let connection = WebRtcConnection::new(session, &self.ice_servers, events).await?;
        Ok(Box::new(connection))
    }
}

/// A webrtc-rs peer connection reporting its callbacks as [`PeerEvent`]s.
pub struct WebRtcConnection {
    session: SessionId,
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcConnection {
    pub async fn new(
        session: SessionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers.iter().map(to_rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("failed to create peer connection")?,
        );

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state of session {}: {}", session, s);
                    let state = match s {
                        RTCPeerConnectionState::Connected => TransportState::Connected,
                        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
                        RTCPeerConnectionState::Failed => TransportState::Failed,
                        RTCPeerConnectionState::Closed => TransportState::Closed,
                        _ => TransportState::Connecting,
                    };
                    emit(&tx, session, PeerEventKind::StateChanged(state)).await;
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                trace!("Local candidate for session {}: {}", session, init.candidate);
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                };
                emit(&tx, session, PeerEventKind::LocalCandidate(candidate)).await;
            })
        }));

        let track_tx = events.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();

            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => MediaKind::Audio,
                    RTPCodecType::Video => MediaKind::Video,
                    other => {
                        debug!("Ignoring remote track of kind {:?}", other);
                        return;
                    }
                };
                info!("Remote {} track arrived on session {}", kind, session);
                emit(&tx, session, PeerEventKind::RemoteTrack(kind)).await;

                // Keep the receive pipeline draining.
                tokio::spawn(async move { while track.read_rtp().await.is_ok() {} });
            })
        }));

        let negotiation_tx = events;
        peer_connection.on_negotiation_needed(Box::new(move || {
            let tx = negotiation_tx.clone();
            Box::pin(async move {
                emit(&tx, session, PeerEventKind::NegotiationNeeded).await;
            })
        }));

        Ok(Self {
            session,
            peer_connection,
        })
    }
}

#[async_trait]
impl CandidateSink for WebRtcConnection {
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("failed to add ICE candidate")
    }
}

#[async_trait]
impl PeerConnection for WebRtcConnection {
    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        from_rtc(offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc(answer)
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(to_rtc(description)?)
            .await
            .context("failed to set local description")
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(to_rtc(description)?)
            .await
            .context("failed to set remote description")
    }

    async fn attach_media(&self, media: &dyn LocalMedia) -> Result<()> {
        for track in media.tracks() {
            let sender = self
                .peer_connection
                .add_track(track)
                .await
                .context("failed to add local track")?;

            // RTCP has to be read for interceptors to work.
            tokio::spawn(async move {
                let mut rtcp_buf = vec![0u8; 1500];
                while sender.read(&mut rtcp_buf).await.is_ok() {}
            });
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        debug!("Closing peer connection of session {}", self.session);
        self.peer_connection.close().await?;
        Ok(())
    }
}

async fn emit(tx: &mpsc::Sender<PeerEvent>, session: SessionId, kind: PeerEventKind) {
    if tx.send(PeerEvent { session, kind }).await.is_err() {
        trace!("Call loop gone; dropping event of session {}", session);
    }
}

fn to_rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn to_rtc(description: SessionDescription) -> Result<RTCSessionDescription> {
    let rtc = match description.kind {
        SdpType::Offer => RTCSessionDescription::offer(description.sdp)?,
        SdpType::Answer => RTCSessionDescription::answer(description.sdp)?,
        SdpType::Pranswer => RTCSessionDescription::pranswer(description.sdp)?,
        SdpType::Rollback => bail!("rollback descriptions are not supported"),
    };
    Ok(rtc)
}

fn from_rtc(description: RTCSessionDescription) -> Result<SessionDescription> {
    let kind = match description.sdp_type {
        RTCSdpType::Offer => SdpType::Offer,
        RTCSdpType::Answer => SdpType::Answer,
        RTCSdpType::Pranswer => SdpType::Pranswer,
        RTCSdpType::Rollback => SdpType::Rollback,
        RTCSdpType::Unspecified => bail!("connection produced an unspecified description"),
    };
    Ok(SessionDescription {
        kind,
        sdp: description.sdp,
    })
}
