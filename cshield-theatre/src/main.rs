//! CinemaShield Theatre (cshield-theatre) - Main entry point
//!
//! Checks availability, exchanges an access key for a playback session and
//! runs the session on a console surface until it expires.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cshield_common::config::ConfigResolver;
use cshield_common::events::{ClientEvent, EventBus};
use cshield_common::logging;
use cshield_common::time::SystemClock;
use tokio::io::AsyncBufReadExt;
use tokio::signal;
use tracing::info;

use cshield_theatre::console::{availability_banner, ConsoleSurface};
use cshield_theatre::{
    HttpTheatreApi, PlaybackController, SessionAuthenticator, StatusMonitor, TheatreApi,
};

/// Command-line arguments for cshield-theatre
#[derive(Parser, Debug)]
#[command(name = "cshield-theatre")]
#[command(about = "CinemaShield theatre client")]
#[command(version)]
struct Args {
    /// Config file (overrides CSHIELD_CONFIG and the platform default)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    server_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether a movie is ready for playback
    Status,

    /// Authenticate and play until the window ends
    Watch {
        /// Access key; read from stdin when omitted
        #[arg(short, long)]
        key: Option<String>,

        /// Start in presentation mode
        #[arg(long)]
        cinema: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new("cshield-theatre")
        .resolve(args.config.as_deref(), args.server_url.as_deref())
        .context("Failed to resolve configuration")?;

    logging::init("cshield_theatre", &config.logging);
    info!("Using backend {}", config.server_url);

    let api: Arc<dyn TheatreApi> =
        Arc::new(HttpTheatreApi::new(&config).context("Failed to build HTTP client")?);
    let bus = EventBus::default();
    let status = StatusMonitor::new(Arc::clone(&api), bus.clone(), &config.playback);

    match args.command {
        Command::Status => {
            match status.poll_once().await {
                Some(availability) => println!("{}", availability_banner(&availability)),
                None => println!("Status unavailable"),
            }
            Ok(())
        }
        Command::Watch { key, cinema } => {
            if let Some(availability) = status.poll_once().await {
                println!("{}", availability_banner(&availability));
                if !availability.accepts_authentication() {
                    bail!("Playback is not available right now");
                }
            }

            let key = match key {
                Some(key) => key,
                None => read_key().await?,
            };

            let controller = PlaybackController::new(
                Arc::clone(&api),
                Arc::new(ConsoleSurface::default()),
                Arc::new(SystemClock),
                bus.clone(),
                &config.playback,
            );
            let authenticator = SessionAuthenticator::new(api, controller.clone());

            let mut events = bus.subscribe();
            let session = authenticator.authenticate(&key).await?;
            info!(session_id = %session.id, "Session active");

            if cinema {
                controller.enter_cinema_mode().await;
            }

            let wait_for_expiry = async {
                if session.state.is_terminal() {
                    return;
                }
                loop {
                    match events.recv().await {
                        Ok(ClientEvent::SessionExpired { .. }) => break,
                        Ok(_) => {}
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            };

            tokio::select! {
                _ = wait_for_expiry => info!("Session ended"),
                _ = shutdown_signal() => controller.teardown().await,
            }
            Ok(())
        }
    }
}

/// Read one line from stdin
async fn read_key() -> Result<String> {
    eprint!("Access key: ");
    let mut line = String::new();
    tokio::io::BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read access key")?;
    Ok(line)
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
