//! Accessibility API backend (macOS)
//!
//! Queries `AXSelectedText` on the element under the cursor and on its
//! `AXChildren`. All references returned by `Copy` functions are owned
//! by [`AxElement`] and released on drop.

use crate::capture::accessibility::{AccessibilityProvider, AccessibleElement, QueryError, QueryResult};
use crate::detector::error::{DetectorError, DetectorResult};
use core_foundation::array::{CFArrayGetCount, CFArrayGetTypeID, CFArrayGetValueAtIndex, CFArrayRef};
use core_foundation::base::{CFGetTypeID, CFRelease, CFRetain, CFTypeRef, TCFType};
use core_foundation::string::{CFString, CFStringRef};
use std::ffi::c_void;

type AXUIElementRef = CFTypeRef;
type AXError = i32;

const K_AX_ERROR_SUCCESS: AXError = 0;
const K_AX_ERROR_ATTRIBUTE_UNSUPPORTED: AXError = -25205;
const K_AX_ERROR_API_DISABLED: AXError = -25211;
const K_AX_ERROR_NO_VALUE: AXError = -25212;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXUIElementCreateSystemWide() -> AXUIElementRef;
    fn AXUIElementCopyElementAtPosition(
        element: AXUIElementRef,
        x: f32,
        y: f32,
        element_at_position: *mut AXUIElementRef,
    ) -> AXError;
    fn AXUIElementCopyAttributeValue(
        element: AXUIElementRef,
        attribute: CFTypeRef,
        value: *mut CFTypeRef,
    ) -> AXError;
}

/// Whether this process may use the Accessibility API
pub fn has_accessibility_permission() -> bool {
    unsafe { AXIsProcessTrusted() }
}

/// Copy an attribute value. `Ok(None)` when the attribute has no value.
fn copy_attribute(element: AXUIElementRef, name: &str) -> QueryResult<Option<CFTypeRef>> {
    let attribute = CFString::new(name);
    let mut value: CFTypeRef = std::ptr::null();

    let error = unsafe {
        AXUIElementCopyAttributeValue(
            element,
            attribute.as_concrete_TypeRef() as *const c_void,
            &mut value,
        )
    };

    match error {
        K_AX_ERROR_SUCCESS if value.is_null() => Ok(None),
        K_AX_ERROR_SUCCESS => Ok(Some(value)),
        K_AX_ERROR_NO_VALUE => Ok(None),
        K_AX_ERROR_ATTRIBUTE_UNSUPPORTED => Err(QueryError::PatternUnsupported),
        K_AX_ERROR_API_DISABLED => Err(QueryError::Platform(
            "Accessibility API disabled".to_string(),
        )),
        other => Err(QueryError::Platform(format!("{} failed with AXError {}", name, other))),
    }
}

/// Take ownership of a copied value and read it as a string.
fn take_string(value: CFTypeRef) -> Option<String> {
    unsafe {
        if CFGetTypeID(value) == CFString::type_id() {
            Some(CFString::wrap_under_create_rule(value as CFStringRef).to_string())
        } else {
            CFRelease(value);
            None
        }
    }
}

/// System-wide accessibility root
pub struct AxProvider {
    system_wide: AXUIElementRef,
}

impl AxProvider {
    /// Fails when the process is not trusted for accessibility; that
    /// condition cannot be recovered from inside the detector.
    pub fn new() -> DetectorResult<Self> {
        if !has_accessibility_permission() {
            return Err(DetectorError::PermissionDenied(
                "Accessibility access not granted. Allow this app in System Settings → Privacy & Security → Accessibility."
                    .to_string(),
            ));
        }

        let system_wide = unsafe { AXUIElementCreateSystemWide() };
        if system_wide.is_null() {
            return Err(DetectorError::PlatformError(
                "Failed to create system-wide accessibility element".to_string(),
            ));
        }

        Ok(Self { system_wide })
    }
}

impl Drop for AxProvider {
    fn drop(&mut self) {
        unsafe { CFRelease(self.system_wide) };
    }
}

impl AccessibilityProvider for AxProvider {
    type Element = AxElement;

    fn element_at(&self, x: i32, y: i32) -> QueryResult<AxElement> {
        let mut element: AXUIElementRef = std::ptr::null();
        let error = unsafe {
            AXUIElementCopyElementAtPosition(self.system_wide, x as f32, y as f32, &mut element)
        };

        if error == K_AX_ERROR_API_DISABLED {
            return Err(QueryError::Platform("Accessibility API disabled".to_string()));
        }
        if error != K_AX_ERROR_SUCCESS || element.is_null() {
            return Err(QueryError::ElementNotFound { x, y });
        }

        Ok(AxElement(element))
    }
}

/// Owned `AXUIElementRef`
pub struct AxElement(AXUIElementRef);

impl Drop for AxElement {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0) };
    }
}

impl AccessibleElement for AxElement {
    fn selected_text(&self) -> QueryResult<String> {
        let value = copy_attribute(self.0, "AXSelectedText")?.ok_or(QueryError::NoSelection)?;
        take_string(value).ok_or(QueryError::PatternUnsupported)
    }

    fn children(&self) -> QueryResult<Vec<Self>> {
        let value = match copy_attribute(self.0, "AXChildren") {
            Ok(Some(value)) => value,
            Ok(None) | Err(QueryError::PatternUnsupported) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut children = Vec::new();
        unsafe {
            if CFGetTypeID(value) == CFArrayGetTypeID() {
                let array = value as CFArrayRef;
                for index in 0..CFArrayGetCount(array) {
                    let child = CFArrayGetValueAtIndex(array, index);
                    if !child.is_null() {
                        CFRetain(child);
                        children.push(AxElement(child));
                    }
                }
            }
            CFRelease(value);
        }

        Ok(children)
    }

    fn describe(&self) -> String {
        copy_attribute(self.0, "AXRole")
            .ok()
            .flatten()
            .and_then(take_string)
            .unwrap_or_else(|| "AXUnknown".to_string())
    }
}
