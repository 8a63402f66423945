use crate::capture::input::{InputSampler, PointerState};
use crate::detector::error::{DetectorError, DetectorResult};
use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, VK_LBUTTON, VK_RBUTTON};
use windows::Win32::UI::WindowsAndMessaging::{GetCursorPos, GetSystemMetrics, SM_SWAPBUTTON};

/// Pointer reader backed by `GetCursorPos` / `GetAsyncKeyState`.
///
/// The async key state is used because the polling thread owns no message
/// queue, so the per-thread key state would never change.
pub struct WindowsInputSampler;

impl WindowsInputSampler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsInputSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSampler for WindowsInputSampler {
    fn read_pointer(&mut self) -> DetectorResult<PointerState> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }
            .map_err(|e| DetectorError::PlatformError(format!("GetCursorPos failed: {}", e)))?;

        // With swapped buttons the right physical button is primary.
        let swapped = unsafe { GetSystemMetrics(SM_SWAPBUTTON) } != 0;
        let key = if swapped { VK_RBUTTON } else { VK_LBUTTON };
        let state = unsafe { GetAsyncKeyState(i32::from(key.0)) };

        Ok(PointerState {
            x: point.x,
            y: point.y,
            primary_down: (state as u16 & 0x8000) != 0,
        })
    }
}
