//! Input sampling (cursor position, primary button)
//!
//! Platform readers live under `capture::macos` / `capture::windows`;
//! this module holds the shared types and the sampler seam.

pub mod sampler;
pub mod types;

pub use sampler::{sample, InputSampler};
pub use types::{CursorSample, InputSample, PointerState};
