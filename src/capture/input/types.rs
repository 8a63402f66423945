use serde::{Deserialize, Serialize};

/// Cursor position at a given instant, in screen pixels.
///
/// `timestamp_ms` is milliseconds on the detector's clock, not wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorSample {
    pub x: i32,
    pub y: i32,
    pub timestamp_ms: u64,
}

impl CursorSample {
    pub fn new(x: i32, y: i32, timestamp_ms: u64) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// Euclidean distance in pixels to another sample.
    pub fn distance_to(&self, other: &CursorSample) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Raw pointer reading from the platform, before it is timestamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub x: i32,
    pub y: i32,
    pub primary_down: bool,
}

/// One tick's worth of input: where the cursor is and whether the
/// primary button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSample {
    pub cursor: CursorSample,
    pub primary_down: bool,
}

impl InputSample {
    pub fn from_pointer(state: PointerState, timestamp_ms: u64) -> Self {
        Self {
            cursor: CursorSample::new(state.x, state.y, timestamp_ms),
            primary_down: state.primary_down,
        }
    }
}
