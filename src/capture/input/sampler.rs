//! Input sampling seam.
//!
//! The polling loop reads the pointer through [`InputSampler`] so the
//! platform readers and the scripted samplers used in tests are
//! interchangeable.

use crate::capture::input::types::{InputSample, PointerState};
use crate::detector::error::DetectorResult;

/// Reads absolute pointer coordinates and primary-button state.
///
/// Implementations must be cheap; they run on every poll tick.
pub trait InputSampler {
    fn read_pointer(&mut self) -> DetectorResult<PointerState>;
}

impl<S: InputSampler + ?Sized> InputSampler for Box<S> {
    fn read_pointer(&mut self) -> DetectorResult<PointerState> {
        (**self).read_pointer()
    }
}

/// Read the pointer and stamp it with `now_ms`.
pub fn sample<S: InputSampler + ?Sized>(sampler: &mut S, now_ms: u64) -> DetectorResult<InputSample> {
    let state = sampler.read_pointer()?;
    Ok(InputSample::from_pointer(state, now_ms))
}
