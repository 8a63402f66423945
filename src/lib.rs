//! Selection Detector - passive desktop text-selection detection.
//!
//! Watches the pointer and the primary mouse button on a fixed poll
//! interval, recognises press-drag-release gestures, and asks the
//! platform accessibility layer for the text selected under the release
//! point. No clipboard access and no synthetic key presses are involved.
//!
//! The pipeline is Sampler -> Classifier -> Resolver:
//!
//! - [`capture::input`]: cursor position and primary-button state
//! - [`detector::gesture`]: press/release tracking and drag classification
//! - [`detector::resolver`]: accessibility lookup, de-duplication, emission
//!
//! [`SelectionDetector`] owns the polling thread.

pub mod capture;
pub mod config;
pub mod detector;

pub use capture::{CursorSample, InputSample};
pub use config::DetectorConfig;
pub use detector::{
    DetectorError, DetectorResult, ResetHandle, SelectionDetector, SelectionEvent, SelectionSink,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber.
///
/// Honours `RUST_LOG`; falls back to debug output for this crate. Calling
/// this more than once is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "selection_detector=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
