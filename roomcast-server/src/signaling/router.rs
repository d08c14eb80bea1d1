use crate::config::RelayConfig;
use crate::signaling::{SignalingService, ws_handler};
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

const BANNER: &str = "RoomCast signaling relay\n\
Connect a WebSocket to /ws?room=<room id>&peer=<peer id>\n";

pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(banner))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(service)
}

async fn banner() -> &'static str {
    BANNER
}

/// Binds `config.listen_addr` and serves until Ctrl-C.
pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    serve_on(listener, config, shutdown_signal()).await
}

pub async fn serve_on<F>(listener: TcpListener, config: RelayConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("Signaling relay listening on ws://{}/ws", addr);

    let app = router(SignalingService::new(config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("relay server failed")?;

    info!("Signaling relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
