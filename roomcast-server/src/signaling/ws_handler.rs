use crate::signaling::{PeerSession, SessionFlow, SignalingService};
use crate::transport::PeerOutbox;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use roomcast_core::{Envelope, PeerId, RoomId};
use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub room: Option<String>,
    pub peer: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(service): State<SignalingService>,
) -> Response {
    let room = params.room.filter(|r| !r.is_empty());
    let peer = params.peer.filter(|p| !p.is_empty());
    let (Some(room), Some(peer)) = (room, peer) else {
        return (StatusCode::BAD_REQUEST, "missing room or peer query parameter").into_response();
    };

    let max_message_size = service.config().max_message_size;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| {
            handle_socket(socket, RoomId::from(room), PeerId::from(peer), service)
        })
        .into_response()
}

async fn handle_socket(
    socket: WebSocket,
    room_id: RoomId,
    peer_id: PeerId,
    service: SignalingService,
) {
    info!("New WebSocket connection: peer {} room {}", peer_id, room_id);

    let config = service.config();
    let (ping_interval, idle_timeout) = (config.ping_interval, config.idle_timeout);
    let (mut sender, mut receiver) = socket.split();
    let (outbox, mut rx) = PeerOutbox::channel(peer_id.clone(), config.outbox_capacity);

    let session = match PeerSession::admit(
        service.registry().clone(),
        room_id.clone(),
        peer_id.clone(),
        outbox,
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            warn!("Peer {} not admitted to room {}: {}", peer_id, room_id, e);
            while let Ok(envelope) = rx.try_recv() {
                if send_envelope(&mut sender, &envelope).await.is_err() {
                    return;
                }
            }
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let mut send_task = tokio::spawn(async move {
        let mut keepalive = tokio::time::interval(ping_interval);
        keepalive.tick().await;

        loop {
            tokio::select! {
                envelope = rx.recv() => {
                    let Some(envelope) = envelope else {
                        break;
                    };
                    if send_envelope(&mut sender, &envelope).await.is_err() {
                        break;
                    }
                }
                _ = keepalive.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    });

    let mut recv_task = tokio::spawn({
        let session = session.clone();

        async move {
            loop {
                let next = match tokio::time::timeout(idle_timeout, receiver.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            "Peer {} silent for {:?}; dropping connection",
                            session.peer_id(),
                            idle_timeout
                        );
                        break;
                    }
                };
                let Some(Ok(msg)) = next else {
                    break;
                };

                match msg {
                    Message::Text(text) => {
                        if session.handle_text(text.as_str()).await == SessionFlow::Leave {
                            break;
                        }
                    }
                    Message::Binary(_) => {
                        warn!("Ignoring binary frame from peer {}", session.peer_id());
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    session.close().await;
    info!("WebSocket disconnected: peer {} room {}", peer_id, room_id);
}

async fn send_envelope(
    sender: &mut SplitSink<WebSocket, Message>,
    envelope: &Envelope,
) -> Result<(), axum::Error> {
    match envelope.encode() {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            error!("Failed to serialize {:?} envelope: {}", envelope.kind, e);
            Ok(())
        }
    }
}
