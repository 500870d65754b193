//! DevBytes command-line front end.
//!
//! Refreshes the offline video cache and prints what it holds.

mod error;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use devbytes_cache::VideoStore;
use devbytes_config::Config;
use devbytes_network::source::HttpPlaylistSource;
use devbytes_repository::{DevByteVideo, VideosRepository};
use exn::ResultExt;
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "devbytes", version, about = "Offline cache for the DevBytes video playlist")]
struct Cli {
    /// Configuration file (defaults to config.toml in the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the playlist, update the cache and print it
    Refresh {
        #[arg(long)]
        json: bool,
    },
    /// Print the cached playlist without touching the network
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the cached playlist every time it changes, until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let repository = repository(&config).await?;
    match cli.command {
        Command::Refresh { json } => {
            repository.refresh().await.or_raise(|| ErrorKind::Refresh)?;
            print_videos(&cached(&repository).await?, json)
        },
        Command::List { json } => print_videos(&cached(&repository).await?, json),
        Command::Watch => watch(repository).await,
    }
}

async fn repository(config: &Config) -> Result<VideosRepository> {
    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Open)?;
    }
    let store = VideoStore::get_instance(&config.database).await.or_raise(|| ErrorKind::Open)?;
    let source = HttpPlaylistSource::new(&config.endpoint, config.timeout(), config.connect_timeout())
        .or_raise(|| ErrorKind::Source)?;
    tracing::debug!(endpoint = %source.endpoint(), database = %config.database.display(), "Opened offline cache");
    Ok(VideosRepository::new(Arc::new(source), store.clone()))
}

async fn cached(repository: &VideosRepository) -> Result<Vec<DevByteVideo>> {
    let records = repository.store().list_all().await.or_raise(|| ErrorKind::Read)?;
    Ok(devbytes_repository::mapper::records_to_domain(records.iter()))
}

async fn watch(repository: VideosRepository) -> Result<()> {
    let mut videos = Box::pin(repository.videos());
    let refresh = repository.spawn_refresh();
    tokio::spawn(async move {
        match refresh.await {
            Ok(Ok(())) => {},
            // Keep showing the cache; it is still the best we have.
            Ok(Err(err)) => tracing::warn!(error = ?err, "Refresh failed"),
            Err(err) => tracing::warn!(error = %err, "Refresh task did not finish"),
        }
    });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = videos.next() => match next {
                Some(current) => print_videos(&current, false)?,
                None => break,
            },
        }
    }
    Ok(())
}

fn print_videos(videos: &[DevByteVideo], json: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, videos).or_raise(|| ErrorKind::Output)?;
        writeln!(out).or_raise(|| ErrorKind::Output)?;
        return Ok(());
    }
    writeln!(out, "{} cached videos", videos.len()).or_raise(|| ErrorKind::Output)?;
    for video in videos {
        writeln!(out, "\n{}\n  {}\n  updated {}\n  {}", video.title, video.url, video.updated, video.short_description())
            .or_raise(|| ErrorKind::Output)?;
    }
    out.flush().or_raise(|| ErrorKind::Output)
}
