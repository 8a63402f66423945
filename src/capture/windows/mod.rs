//! Windows capture implementations
//!
//! Uses Win32 for pointer state and UI Automation for selected text.

pub mod accessibility;
pub mod input;

pub use accessibility::{UiaElement, UiaProvider};
pub use input::WindowsInputSampler;

/// Windows grants UI Automation access to every desktop process
pub mod permissions {
    pub fn has_accessibility_permission() -> bool {
        true
    }
}
