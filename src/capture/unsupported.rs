//! Fallback for targets without a selection backend.
//!
//! Both constructors fail, so `SelectionDetector::start` reports a
//! platform error instead of polling forever without results.

use crate::capture::accessibility::{AccessibilityProvider, AccessibleElement, QueryResult};
use crate::capture::input::{InputSampler, PointerState};
use crate::detector::error::{DetectorError, DetectorResult};

fn unsupported() -> DetectorError {
    DetectorError::PlatformError(format!(
        "Selection detection is not implemented for {}",
        std::env::consts::OS
    ))
}

pub struct UnsupportedSampler(());

impl UnsupportedSampler {
    pub fn new() -> DetectorResult<Self> {
        Err(unsupported())
    }
}

impl InputSampler for UnsupportedSampler {
    fn read_pointer(&mut self) -> DetectorResult<PointerState> {
        Err(unsupported())
    }
}

pub struct UnsupportedProvider(());

impl UnsupportedProvider {
    pub fn new() -> DetectorResult<Self> {
        Err(unsupported())
    }
}

pub enum NoElement {}

impl AccessibleElement for NoElement {
    fn selected_text(&self) -> QueryResult<String> {
        match *self {}
    }

    fn children(&self) -> QueryResult<Vec<Self>> {
        match *self {}
    }
}

impl AccessibilityProvider for UnsupportedProvider {
    type Element = NoElement;

    fn element_at(&self, x: i32, y: i32) -> QueryResult<NoElement> {
        Err(crate::capture::accessibility::QueryError::ElementNotFound { x, y })
    }
}

pub mod permissions {
    pub fn has_accessibility_permission() -> bool {
        false
    }
}
