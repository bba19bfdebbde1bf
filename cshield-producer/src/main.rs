//! CinemaShield Producer (cshield-producer) - Main entry point
//!
//! Uploads a movie, follows its processing to the access key, and shows
//! the history and audit trail.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cshield_common::config::ConfigResolver;
use cshield_common::events::{ClientEvent, EventBus};
use cshield_common::human_time::format_size;
use cshield_common::logging;
use tokio::signal;
use tracing::info;

use cshield_producer::console::{self, ConsolePresenter};
use cshield_producer::pipeline::MonitorStatus;
use cshield_producer::views::{AuditView, HistoryView};
use cshield_producer::{HttpProducerApi, PipelineWatcher, ProducerApi, TransferSubmitter};

/// Command-line arguments for cshield-producer
#[derive(Parser, Debug)]
#[command(name = "cshield-producer")]
#[command(about = "CinemaShield producer client")]
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
    /// Upload a movie and follow processing to the access key
    Upload {
        /// Movie file (MP4, MKV, AVI or MOV)
        file: PathBuf,

        /// Theatre the key is bound to; blank uses the configured default
        #[arg(short, long)]
        theatre_id: Option<String>,
    },

    /// List processed movies
    History,

    /// Show the most recent audit entries
    Audit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new("cshield-producer")
        .resolve(args.config.as_deref(), args.server_url.as_deref())
        .context("Failed to resolve configuration")?;

    logging::init("cshield_producer", &config.logging);
    info!("Using backend {}", config.server_url);

    let api: Arc<dyn ProducerApi> =
        Arc::new(HttpProducerApi::new(&config).context("Failed to build HTTP client")?);

    match args.command {
        Command::Upload { file, theatre_id } => {
            let bus = EventBus::default();
            let submitter = TransferSubmitter::new(Arc::clone(&api), bus.clone(), &config);
            let watcher = PipelineWatcher::new(api, Arc::new(ConsolePresenter), bus.clone());
            upload(&submitter, &watcher, &bus, file, theatre_id).await
        }
        Command::History => {
            let mut view = HistoryView::new(api);
            println!("{}", console::render_history(view.refresh().await));
            Ok(())
        }
        Command::Audit => {
            let mut view = AuditView::new(api);
            println!("{}", console::render_audit(view.refresh().await));
            Ok(())
        }
    }
}

async fn upload(
    submitter: &TransferSubmitter,
    watcher: &PipelineWatcher,
    bus: &EventBus,
    file: PathBuf,
    theatre_id: Option<String>,
) -> Result<()> {
    let mut events = bus.subscribe();
    let progress_printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let ClientEvent::UploadProgress {
                percent,
                bytes_sent,
                total_bytes,
                ..
            } = event
            {
                println!(
                    "Uploading {}  {} / {}",
                    console::progress_bar(percent),
                    format_size(bytes_sent),
                    format_size(total_bytes)
                );
            }
        }
    });

    let submitted = submitter.submit(file, theatre_id.as_deref()).await;
    progress_printer.abort();
    let job = submitted?;
    println!("Uploaded {} for {} (job {})", job.file_name, job.theatre_id, job.job_id);

    let subscription = watcher.open(job.job_id.clone());
    let mut snapshots = subscription.snapshots();
    let renderer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            println!("{}", console::render_snapshot(&snapshots.borrow_and_update()));
        }
    });

    let snapshot = tokio::select! {
        snapshot = subscription.finished() => snapshot,
        _ = shutdown_signal() => {
            watcher.close();
            renderer.abort();
            bail!("Interrupted while processing job {}", job.job_id);
        }
    };
    renderer.abort();

    match snapshot.status {
        MonitorStatus::Completed(_) => Ok(()),
        MonitorStatus::Failed(failure) => bail!("Processing failed: {}", failure),
        MonitorStatus::Running => bail!("Progress subscription closed early"),
    }
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
