//! Platform-specific capture implementations
//!
//! This module provides pointer sampling and accessibility queries for
//! each platform, behind the [`InputSampler`] and
//! [`AccessibilityProvider`] seams.

pub mod accessibility;
pub mod input;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub mod unsupported;

use crate::detector::error::DetectorResult;

pub use accessibility::{
    lookup_selected_text, AccessibilityProvider, AccessibleElement, FoundText, QueryError,
    QueryResult, TextSource,
};
pub use input::{CursorSample, InputSample, InputSampler, PointerState};

#[cfg(target_os = "macos")]
use self::macos as platform;

#[cfg(target_os = "windows")]
use self::windows as platform;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
use self::unsupported as platform;

#[cfg(target_os = "macos")]
pub type PlatformSampler = macos::MacInputSampler;
#[cfg(target_os = "macos")]
pub type PlatformAccessibility = macos::AxProvider;

#[cfg(target_os = "windows")]
pub type PlatformSampler = windows::WindowsInputSampler;
#[cfg(target_os = "windows")]
pub type PlatformAccessibility = windows::UiaProvider;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub type PlatformSampler = unsupported::UnsupportedSampler;
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub type PlatformAccessibility = unsupported::UnsupportedProvider;

/// Pointer reader for the current platform
pub fn platform_sampler() -> DetectorResult<PlatformSampler> {
    #[cfg(target_os = "windows")]
    {
        Ok(PlatformSampler::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        PlatformSampler::new()
    }
}

/// Accessibility provider for the current platform.
///
/// Must be called on the thread that will use the provider.
pub fn platform_accessibility() -> DetectorResult<PlatformAccessibility> {
    PlatformAccessibility::new()
}

/// Whether the accessibility layer is usable by this process
pub fn has_accessibility_permission() -> bool {
    platform::permissions::has_accessibility_permission()
}
