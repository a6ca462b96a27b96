//! CLI binary for goalboard.
//!
//! `goalboard run` renders frames to stdout and reads newline-delimited
//! JSON input events (`{"event":"next"}`) from stdin. All tracing output
//! goes to stderr.

use clap::{Parser, Subcommand};
use goalboard::input::spawn_stdin_reader;
use goalboard::{BoardConfig, Dashboard, JsonlPhotoStore, PhotoSelector, PhotoStore, TextRenderer};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Input events buffered between the stdin reader and the dashboard loop.
const INPUT_CAPACITY: usize = 32;

/// Goalboard: rotating goals, Trello cards and photos.
#[derive(Parser)]
#[command(name = "goalboard", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the display.
    Run,

    /// Manage the photo store.
    Photos {
        #[command(subcommand)]
        action: PhotosAction,
    },
}

#[derive(Subcommand)]
enum PhotosAction {
    /// Add an image (jpg, jpeg, png, gif, webp, bmp).
    Add {
        /// Image file to add.
        file: PathBuf,
    },

    /// List stored photos with their positions.
    List,

    /// Remove a photo by position or name.
    Remove {
        /// Zero-based position or file name.
        target: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("goalboard=info,goalboard_trello=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = BoardConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_display(config).await,
        Command::Photos { action } => manage_photos(&config, action),
    }
}

async fn run_display(config: BoardConfig) -> anyhow::Result<()> {
    let renderer = TextRenderer::new(std::io::stdout());
    let mut dashboard = Dashboard::from_config(&config, renderer)?;
    info!(
        remote = config.trello_config().is_some(),
        goals = config.goals.len(),
        "goalboard starting"
    );

    let cancel = CancellationToken::new();
    let (input_tx, input_rx) = mpsc::channel(INPUT_CAPACITY);

    // Detached: a read parked on an open terminal must not hold up exit.
    spawn_stdin_reader(input_tx)?;

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            signal_cancel.cancel();
        }
    });

    dashboard
        .run(input_rx, cancel)
        .await
        .map_err(|e| anyhow::anyhow!("goalboard failed: {e}"))?;

    info!("goalboard shut down cleanly");
    Ok(())
}

fn manage_photos(config: &BoardConfig, action: PhotosAction) -> anyhow::Result<()> {
    let store = JsonlPhotoStore::new(config.photos_path());
    match action {
        PhotosAction::Add { file } => {
            let photo = store.add(&file)?;
            let total = store.list()?.len();
            println!("Added: {}", photo.name);
            println!("  Total photos: {total}");
        }
        PhotosAction::List => {
            let photos = store.list()?;
            if photos.is_empty() {
                println!("No photos in {}", store.path().display());
            }
            for (index, photo) in photos.iter().enumerate() {
                println!(
                    "[{index}] {} (added {})",
                    photo.name,
                    photo.added_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        PhotosAction::Remove { target } => {
            let removed = store.remove(&PhotoSelector::parse(&target))?;
            let remaining = store.list()?.len();
            println!("Removed: {}", removed.name);
            println!("  Remaining photos: {remaining}");
        }
    }
    Ok(())
}
