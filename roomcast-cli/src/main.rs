use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::*;
use roomcast::client::{CallClient, CallPhase, CallState, EndReason, EngineConfig};
use roomcast::model::{DEFAULT_STUN_ADDR, IceServerConfig};
use roomcast::server::{RelayConfig, serve};
use roomcast::{PeerId, RoomId};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AUTO_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "roomcast", version, about = "Two-peer WebRTC signaling relay and call client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve(ServeArgs),
    /// Join a room and hold a call with synthetic media until Ctrl-C.
    ///
    /// Reads single-letter commands from stdin: `r` retry, `a` / `v` toggle audio / video, `q` leave.
    Call(CallArgs),
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, env = "ROOMCAST_LISTEN", default_value = "0.0.0.0:8888")]
    listen: SocketAddr,

    #[arg(long, env = "ROOMCAST_OUTBOX_CAPACITY", default_value_t = 256)]
    outbox_capacity: usize,

    #[arg(long, env = "ROOMCAST_PING_INTERVAL_SECS", default_value_t = 25)]
    ping_interval_secs: u64,

    #[arg(long, env = "ROOMCAST_IDLE_TIMEOUT_SECS", default_value_t = 60)]
    idle_timeout_secs: u64,

    #[arg(long, env = "ROOMCAST_MAX_MESSAGE_SIZE", default_value_t = 1 << 20)]
    max_message_size: usize,
}

#[derive(Args)]
struct CallArgs {
    #[arg(long, env = "ROOMCAST_RELAY_URL", default_value = "ws://localhost:8888/ws")]
    relay_url: String,

    #[arg(long, env = "ROOMCAST_ROOM", default_value = "demo")]
    room: String,

    /// Peer id to join with; random when omitted.
    #[arg(long, env = "ROOMCAST_PEER")]
    peer: Option<String>,

    #[arg(long, env = "ROOMCAST_STUN_URL", default_value = DEFAULT_STUN_ADDR)]
    stun_url: String,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    turn_credential: Option<String>,

    #[arg(long)]
    mute_audio: bool,

    #[arg(long)]
    mute_video: bool,

    /// Start a fresh session on its own after a retryable failure.
    #[arg(long, env = "ROOMCAST_AUTO_RETRY")]
    auto_retry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Retry,
    ToggleAudio,
    ToggleVideo,
    Quit,
}

impl Key {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "r" | "retry" => Some(Key::Retry),
            "a" | "audio" => Some(Key::ToggleAudio),
            "v" | "video" => Some(Key::ToggleVideo),
            "q" | "quit" => Some(Key::Quit),
            _ => None,
        }
    }
}

impl ServeArgs {
    fn into_config(self) -> RelayConfig {
        RelayConfig {
            listen_addr: self.listen,
            outbox_capacity: self.outbox_capacity,
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            max_message_size: self.max_message_size,
            ..RelayConfig::default()
        }
    }
}

impl CallArgs {
    fn engine_config(&self) -> EngineConfig {
        let mut ice_servers = vec![IceServerConfig::stun(self.stun_url.clone())];
        if let Some(url) = &self.turn_url {
            ice_servers.push(IceServerConfig::turn(
                url.clone(),
                self.turn_username.clone(),
                self.turn_credential.clone(),
            ));
        }

        EngineConfig {
            relay_url: self.relay_url.clone(),
            peer_id: self.peer.clone().map(PeerId::from),
            ice_servers,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve(args) => {
            println!("{}", "Starting roomcast relay...".green().bold());
            serve(args.into_config()).await
        }
        Commands::Call(args) => call(args).await,
    }
}

async fn call(args: CallArgs) -> Result<()> {
    let config = args.engine_config();
    let mut client = CallClient::with_webrtc(&config);
    let mut states = client.subscribe();

    println!(
        "Joining room {} as {}",
        args.room.cyan().bold(),
        client.local_id().to_string().cyan()
    );
    client
        .join(RoomId::from(args.room.as_str()))
        .await
        .context("could not join room")?;

    let mut audio_muted = args.mute_audio;
    let mut video_muted = args.mute_video;
    if audio_muted {
        client.mute_audio(true).await?;
    }
    if video_muted {
        client.mute_video(true).await?;
    }

    let mut keys = BufReader::new(tokio::io::stdin()).lines();
    let mut keys_open = true;

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break None,
            changed = states.changed() => {
                if changed.is_err() {
                    break None;
                }
                let state = states.borrow_and_update().clone();
                print_state(&state);
                let CallPhase::Ended(reason) = state.phase else {
                    continue;
                };
                if is_fatal(&reason) {
                    break Some(reason);
                }
                if reason.is_retryable() {
                    if args.auto_retry {
                        info!("Retrying in {:?} after {}", AUTO_RETRY_DELAY, reason);
                        tokio::time::sleep(AUTO_RETRY_DELAY).await;
                        client.retry().await?;
                    } else {
                        println!("{}", "Type r and Enter to retry.".dimmed());
                    }
                }
            }
            line = keys.next_line(), if keys_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        keys_open = false;
                        continue;
                    }
                    Err(e) => {
                        warn!("Stopped reading stdin: {}", e);
                        keys_open = false;
                        continue;
                    }
                };
                match Key::parse(&line) {
                    Some(Key::Retry) => client.retry().await?,
                    Some(Key::ToggleAudio) => {
                        audio_muted = !audio_muted;
                        client.mute_audio(audio_muted).await?;
                        println!("[call] audio {}", if audio_muted { "muted" } else { "on" });
                    }
                    Some(Key::ToggleVideo) => {
                        video_muted = !video_muted;
                        client.mute_video(video_muted).await?;
                        println!("[call] video {}", if video_muted { "muted" } else { "on" });
                    }
                    Some(Key::Quit) => break None,
                    None => println!("{}", "Commands: r (retry), a (audio), v (video), q (quit)".dimmed()),
                }
            }
        }
    };

    info!("Leaving room {}", args.room);
    if client.room_id().is_some() {
        client.leave().await?;
    }

    match outcome {
        Some(reason) => bail!("call ended: {}", reason),
        None => Ok(()),
    }
}

/// Reasons after which staying in the room makes no sense.
fn is_fatal(reason: &EndReason) -> bool {
    matches!(
        reason,
        EndReason::RoomFull | EndReason::PeerIdTaken | EndReason::RelayLost
    )
}

fn print_state(state: &CallState) {
    let phase = state.phase.to_string();
    let phase = match &state.phase {
        CallPhase::Idle | CallPhase::Waiting => phase.yellow(),
        CallPhase::Connecting => phase.cyan(),
        CallPhase::Connected => phase.green().bold(),
        CallPhase::Ended(reason) if reason.is_retryable() => phase.red(),
        CallPhase::Ended(_) => phase.red().bold(),
    };

    let media = if state.remote_media_available {
        "remote media flowing".green()
    } else {
        "no remote media".dimmed()
    };
    println!("[call] {} ({})", phase, media);
}
