//! Press/release tracking
//!
//! A release only counts as a candidate selection when the cursor moved
//! strictly more than the drag threshold since the press. Stationary
//! clicks never reach the accessibility layer.

use crate::capture::input::{CursorSample, InputSample};
use tracing::debug;

/// In-progress press-drag sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureState {
    pub is_button_down: bool,
    pub press_position: Option<CursorSample>,
}

/// Outcome of feeding one tick to the classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Button state unchanged
    None,
    /// Button went down at this position
    Pressed(CursorSample),
    /// Released without enough travel
    Click { distance: f64 },
    /// Released after a drag; resolve selection at `release`
    Candidate {
        press: CursorSample,
        release: CursorSample,
        distance: f64,
    },
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    drag_threshold_px: f64,
    state: GestureState,
}

impl GestureClassifier {
    pub fn new(drag_threshold_px: f64) -> Self {
        Self {
            drag_threshold_px,
            state: GestureState::default(),
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn observe(&mut self, sample: &InputSample) -> Gesture {
        let was_down = self.state.is_button_down;
        self.state.is_button_down = sample.primary_down;

        match (was_down, sample.primary_down) {
            (false, true) => {
                self.state.press_position = Some(sample.cursor);
                debug!("Mouse pressed at ({}, {})", sample.cursor.x, sample.cursor.y);
                Gesture::Pressed(sample.cursor)
            }
            (true, false) => {
                let Some(press) = self.state.press_position.take() else {
                    return Gesture::None;
                };
                let release = sample.cursor;
                let distance = press.distance_to(&release);

                if distance > self.drag_threshold_px {
                    debug!(
                        "Mouse released at ({}, {}) after {:.2}px drag; candidate selection",
                        release.x, release.y, distance
                    );
                    Gesture::Candidate {
                        press,
                        release,
                        distance,
                    }
                } else {
                    debug!(
                        "Mouse released at ({}, {}) after {:.2}px; treated as click",
                        release.x, release.y, distance
                    );
                    Gesture::Click { distance }
                }
            }
            _ => Gesture::None,
        }
    }
}
