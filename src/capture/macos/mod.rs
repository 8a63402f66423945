//! macOS capture implementations
//!
//! Uses CoreGraphics/AppKit for pointer state and the Accessibility API
//! for selected text.

pub mod accessibility;
pub mod input;

pub use accessibility::{AxElement, AxProvider};
pub use input::MacInputSampler;

pub mod permissions {
    pub use super::accessibility::has_accessibility_permission;
}
