use crate::capture::input::{InputSampler, PointerState};
use crate::detector::error::{DetectorError, DetectorResult};
use core_graphics::event::CGEvent;
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use objc2_app_kit::NSEvent;

/// Pointer reader (macOS)
///
/// Position comes from a null `CGEvent`, which reports global coordinates
/// with a top-left origin, the same space `AXUIElementCopyElementAtPosition`
/// expects. `NSEvent::mouseLocation` is bottom-left and would need flipping.
pub struct MacInputSampler {
    source: CGEventSource,
}

impl MacInputSampler {
    pub fn new() -> DetectorResult<Self> {
        let source = CGEventSource::new(CGEventSourceStateID::CombinedSessionState).map_err(|_| {
            DetectorError::PlatformError("Failed to create CGEventSource".to_string())
        })?;
        Ok(Self { source })
    }
}

impl InputSampler for MacInputSampler {
    fn read_pointer(&mut self) -> DetectorResult<PointerState> {
        let event = CGEvent::new(self.source.clone())
            .map_err(|_| DetectorError::PlatformError("Failed to create CGEvent".to_string()))?;
        let location = event.location();

        // Bit 0 = left (primary), bit 1 = right, bit 2 = middle
        let buttons = unsafe { NSEvent::pressedMouseButtons() };

        Ok(PointerState {
            x: location.x.round() as i32,
            y: location.y.round() as i32,
            primary_down: (buttons & 1) != 0,
        })
    }
}
