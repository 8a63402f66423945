//! Demo host for the selection detector.
//!
//! Prints every detected selection as one JSON line on stdout until
//! Ctrl-C. Set `SELECTION_DETECTOR_CONFIG` to a JSON file to override the
//! defaults and `RUST_LOG` to adjust log output.

use anyhow::{Context, Result};
use selection_detector::{capture, init_tracing, DetectorConfig, SelectionDetector, SelectionEvent};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("Starting selection-detector v{}", env!("CARGO_PKG_VERSION"));

    let config = DetectorConfig::from_env().context("Failed to load detector config")?;
    let rearm = config.rearm_after_consume;

    if !capture::has_accessibility_permission() {
        tracing::warn!("Accessibility access is not available; selections cannot be read");
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<SelectionEvent>();

    let mut detector = tokio::task::spawn_blocking(move || SelectionDetector::start(config, tx))
        .await
        .context("Detector startup task failed")?
        .context("Failed to start selection detector")?;
    let reset = detector.reset_handle();

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event)?);
                if rearm {
                    reset.reset_last_selected();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, shutting down");
                break;
            }
        }
    }

    tokio::task::spawn_blocking(move || detector.stop())
        .await
        .context("Detector shutdown task failed")?;

    Ok(())
}
