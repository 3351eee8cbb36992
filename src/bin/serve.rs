use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use segview::{app, AppState, Config, Dataset, PredictClient};
use tokio::net::TcpListener;
use tracing::Level;

#[derive(Parser, Debug)]
struct Args {
    /// Port to listen on; overrides the PORT environment variable.
    #[arg(short, long)]
    port: Option<u16>,

    /// Prediction endpoint; overrides the API_URL environment variable.
    #[arg(short, long)]
    url: Option<String>,

    #[arg(long)]
    image_dir: Option<PathBuf>,

    #[arg(long)]
    mask_dir: Option<PathBuf>,

    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(url) = args.url {
        config.api_url = url;
    }
    if let Some(dir) = args.image_dir {
        config.image_dir = dir;
    }
    if let Some(dir) = args.mask_dir {
        config.mask_dir = dir;
    }

    let dataset = Dataset::new(&config.image_dir, &config.mask_dir);
    match dataset.list_ids() {
        Ok(ids) => tracing::info!(
            "test set: {} images under {}",
            ids.len(),
            config.image_dir.display()
        ),
        Err(err) => tracing::warn!("could not list {}: {err}", config.image_dir.display()),
    }

    let client = PredictClient::new(&config.api_url);
    let router = app::router(AppState { dataset, client });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("listening on http://{addr}, predictions via {}", config.api_url);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not listen on {addr}"))?;
    axum::serve(listener, router).await?;

    Ok(())
}
