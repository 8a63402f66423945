//! UI Automation backend
//!
//! COM objects here are apartment-bound; the provider must be created and
//! used on the polling thread only.

use crate::capture::accessibility::{AccessibilityProvider, AccessibleElement, QueryError, QueryResult};
use crate::detector::error::{DetectorError, DetectorResult};
use windows::Win32::Foundation::POINT;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED,
};
use windows::Win32::UI::Accessibility::{
    CUIAutomation, IUIAutomation, IUIAutomationCondition, IUIAutomationElement,
    IUIAutomationTextPattern, TreeScope_Children, UIA_TextPatternId,
};

fn platform(context: &str, err: windows::core::Error) -> QueryError {
    QueryError::Platform(format!("{}: {}", context, err))
}

/// A null element comes back as an error carrying a success code; anything
/// else is a real COM failure.
fn element_lookup_error(x: i32, y: i32, err: windows::core::Error) -> QueryError {
    if err.code().is_ok() {
        QueryError::ElementNotFound { x, y }
    } else {
        platform("ElementFromPoint", err)
    }
}

/// `IUIAutomation` wrapper owning the thread's COM initialisation.
pub struct UiaProvider {
    automation: IUIAutomation,
    children_condition: IUIAutomationCondition,
    com_initialized: bool,
}

impl UiaProvider {
    /// Initialise COM on the current thread and create the automation object.
    pub fn new() -> DetectorResult<Self> {
        let com_initialized = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }.is_ok();
        if !com_initialized {
            tracing::warn!("COM already initialised with a different apartment model");
        }

        let created = unsafe {
            CoCreateInstance::<_, IUIAutomation>(&CUIAutomation, None, CLSCTX_INPROC_SERVER)
        }
        .and_then(|automation| {
            let condition = unsafe { automation.CreateTrueCondition() }?;
            Ok((automation, condition))
        });

        match created {
            Ok((automation, children_condition)) => Ok(Self {
                automation,
                children_condition,
                com_initialized,
            }),
            Err(e) => {
                if com_initialized {
                    unsafe { CoUninitialize() };
                }
                Err(DetectorError::PlatformError(format!(
                    "UI Automation unavailable: {}",
                    e
                )))
            }
        }
    }
}

impl Drop for UiaProvider {
    fn drop(&mut self) {
        if self.com_initialized {
            unsafe { CoUninitialize() };
        }
    }
}

impl AccessibilityProvider for UiaProvider {
    type Element = UiaElement;

    fn element_at(&self, x: i32, y: i32) -> QueryResult<UiaElement> {
        let element = unsafe { self.automation.ElementFromPoint(POINT { x, y }) }
            .map_err(|e| element_lookup_error(x, y, e))?;
        Ok(UiaElement {
            element,
            children_condition: self.children_condition.clone(),
        })
    }
}

pub struct UiaElement {
    element: IUIAutomationElement,
    children_condition: IUIAutomationCondition,
}

impl AccessibleElement for UiaElement {
    fn selected_text(&self) -> QueryResult<String> {
        let pattern = unsafe {
            self.element
                .GetCurrentPatternAs::<IUIAutomationTextPattern>(UIA_TextPatternId)
        }
        .map_err(|_| QueryError::PatternUnsupported)?;

        let ranges = unsafe { pattern.GetSelection() }.map_err(|e| platform("GetSelection", e))?;
        let count = unsafe { ranges.Length() }.map_err(|e| platform("Length", e))?;
        if count <= 0 {
            return Err(QueryError::NoSelection);
        }

        let first = unsafe { ranges.GetElement(0) }.map_err(|e| platform("GetElement", e))?;
        let text = unsafe { first.GetText(-1) }.map_err(|e| platform("GetText", e))?;
        Ok(text.to_string())
    }

    fn children(&self) -> QueryResult<Vec<Self>> {
        let found = unsafe {
            self.element
                .FindAll(TreeScope_Children, &self.children_condition)
        }
        .map_err(|e| platform("FindAll", e))?;
        let count = unsafe { found.Length() }.map_err(|e| platform("Length", e))?;

        let mut children = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            match unsafe { found.GetElement(index) } {
                Ok(element) => children.push(UiaElement {
                    element,
                    children_condition: self.children_condition.clone(),
                }),
                Err(e) => tracing::trace!("Skipping child {}: {}", index, e),
            }
        }
        Ok(children)
    }

    fn describe(&self) -> String {
        let name = unsafe { self.element.CurrentName() }
            .map(|s| s.to_string())
            .unwrap_or_default();
        let class = unsafe { self.element.CurrentClassName() }
            .map(|s| s.to_string())
            .unwrap_or_default();
        format!("{:?} [{}]", name, class)
    }
}
