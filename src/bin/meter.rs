//! Live microphone meter
//!
//! Connects to the default input device and prints the windowed
//! loudness every 500 ms until Ctrl-C.

use anyhow::Result;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use decibel_monitor::{LevelMonitor, MonitorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from the default location when present
    let config = match MonitorConfig::default_path() {
        Some(path) if path.exists() => MonitorConfig::load(&path)?,
        _ => MonitorConfig::default(),
    };
    tracing::info!(
        "window {} ms, offset {} dB, fft {}",
        config.sample_window_ms,
        config.offset_db,
        config.fft_size,
    );

    let mut monitor = LevelMonitor::from_config(config)?;
    monitor.connect().await?;
    tracing::info!("microphone connected, Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                match monitor.volume() {
                    Ok(db) => println!("level: {} dB", db),
                    Err(e) => tracing::warn!("poll failed: {}", e),
                }
            }
        }
    }

    monitor.disconnect();
    tracing::info!("disconnected");
    Ok(())
}
