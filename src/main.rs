mod auth;
mod config;
mod controller;
mod logging;
mod model;
mod view;

use std::sync::Arc;
use anyhow::Result;
use tokio::io::BufReader;

use controller::{ExternalPlayer, SessionEngine};
use model::{CacheStore, YouTubeClient};

#[tokio::main]
async fn main() -> Result<()> {
    // The log file lives in the cache root, so only the file and the cache
    // root are resolved before logging starts
    let (config_file, config_source) = config::load_config_file()?;
    let cache_dir = config::cache_root(&config_file)?;

    let guard = match logging::init_logging(&cache_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== yt_feed starting ===");
    config_source.log();

    let config = config::load(config_file, cache_dir)
        .inspect_err(|e| tracing::error!(error = ?e, "Configuration failed"))?;

    let provider = Arc::new(YouTubeClient::new(config.api_key.clone(), config.max_results)?);
    let store = CacheStore::new(&config, provider);
    let player = ExternalPlayer::new(config.player.clone());
    let mut engine = SessionEngine::new(store, Box::new(player));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    let code = match engine.run(stdin, &mut stdout).await {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = ?err, "Session terminated");
            eprintln!("Error: {err:#}");
            1
        }
    };

    tracing::info!("yt_feed shutting down");
    drop(guard);

    // A pending stdin read would otherwise keep the runtime from shutting down.
    std::process::exit(code);
}
