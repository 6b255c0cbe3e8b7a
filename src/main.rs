use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use kamishibai::config::Configuration;
use kamishibai::content::ContentHandle;
use kamishibai::events::{InputEvent, UiEvent};
use kamishibai::tasks::{catalog, controller, input};

#[derive(Debug, Parser)]
#[command(
    name = "kamishibai",
    version,
    about = "scene-collection slideshow presenter"
)]
struct Args {
    /// Path to the YAML configuration file.
    config: PathBuf,

    /// Present this collection directory instead of the configured one.
    #[arg(long)]
    collection: Option<PathBuf>,

    /// List collection directories under PARENT and exit.
    #[arg(long, value_name = "PARENT")]
    list: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(parent) = args.list.as_deref() {
        let found = catalog::find_collections(parent)?;
        if found.is_empty() {
            println!("no collections under {}", parent.display());
        } else {
            for entry in &found {
                println!("{}\t{}", entry.name, entry.path.display());
            }
        }
        return Ok(());
    }

    let cfg = Configuration::from_yaml_file(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?
        .validated()?;

    let collection = match args.collection.or_else(|| cfg.collection_path.clone()) {
        Some(path) => path,
        None => bail!("no collection directory: set collection-path in the config or pass --collection"),
    };
    info!(collection = %collection.display(), "starting kamishibai");

    let cancel = CancellationToken::new();
    let (content_tx, content_rx) = mpsc::channel(16);
    let (input_tx, input_rx) = mpsc::channel::<InputEvent>(32);
    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(64);

    let mut tasks = JoinSet::new();
    {
        let cancel = cancel.clone();
        tasks.spawn(async move { catalog::run(content_rx, cancel).await });
    }
    {
        let cancel = cancel.clone();
        let cfg = cfg.clone();
        let content = ContentHandle::new(content_tx);
        tasks.spawn(
            async move { controller::run(cfg, collection, content, input_rx, ui_tx, cancel).await },
        );
    }
    input::spawn(input_tx, cancel.clone());

    let view = tokio::spawn(render_events(ui_rx));

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received, shutting down");
                cancel.cancel();
            }
        });
    }

    let mut failure: Option<anyhow::Error> = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(error = %err, "task failed");
                if failure.is_none() {
                    failure = Some(err);
                }
                cancel.cancel();
            }
            Err(err) => {
                error!(error = %err, "task panicked");
                if failure.is_none() {
                    failure = Some(err.into());
                }
                cancel.cancel();
            }
        }
    }
    cancel.cancel();
    let _ = view.await;

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Stand-in for a host view: renders controller output into the log.
async fn render_events(mut ui: mpsc::Receiver<UiEvent>) {
    while let Some(event) = ui.recv().await {
        match event {
            UiEvent::LoadStarted => info!("loading collection"),
            UiEvent::LoadFailed(message) => error!(%message, "collection failed to load"),
            UiEvent::CollectionChanged(info) => {
                info!(name = %info.name, index = info.index, items = info.total_items, "collection");
            }
            UiEvent::ItemShown(item) => {
                info!(
                    item = item.item_index,
                    collection = item.collection_index,
                    preview_only = item.is_preview,
                    path = %item.asset_path.display(),
                    "showing"
                );
            }
            UiEvent::OverlayChanged { from, to } => info!(?from, ?to, "overlay level"),
            UiEvent::AutoPlayChanged {
                active,
                speed,
                direction,
            } => info!(active, speed = %speed, ?direction, "auto-play"),
            UiEvent::NoticePosted(text) => info!(%text, "notice"),
            UiEvent::NoticeExpired => debug!("notice cleared"),
        }
    }
}
