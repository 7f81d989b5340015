//! # audiopool
//!
//! Headless driver for the audio channel pool. Loads settings, sizes the
//! pool for the host platform, and plays the configured effects and
//! background music against the simulated host.

mod services;

use std::path::PathBuf;

use anyhow::{Context, Result};
use audiopool_core::ConfigFile;
use services::playback::PlaybackService;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "audiopool=info,audiopool_app=info,audiopool_audio=info";

/// Effects played when the settings file lists none.
const DEMO_EFFECTS: [&str; 8] = [
    "click.mp3",
    "coin.mp3",
    "jump.mp3",
    "hit.mp3",
    "coin.mp3",
    "explosion.mp3",
    "powerup.mp3",
    "click.mp3",
];

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ConfigFile::load_or_default(config_path.as_deref())
        .context("Failed to load audiopool settings")?;

    // Initialize logging
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    info!("Starting audiopool v{}", env!("CARGO_PKG_VERSION"));

    let mut service =
        PlaybackService::new(&config).context("Failed to initialize the audio pool")?;

    if let Some(bgm) = &config.bgm {
        service.start_bgm(bgm);
    }

    let effects = if config.effects.is_empty() {
        DEMO_EFFECTS.iter().map(ToString::to_string).collect()
    } else {
        config.effects.clone()
    };

    service.run(&effects).await?;
    service.shutdown();

    Ok(())
}
