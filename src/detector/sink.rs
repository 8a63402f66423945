//! Emission channel
//!
//! Events are handed to a [`SelectionSink`] synchronously, on the polling
//! thread, at the moment they pass filtering. A sink that panics loses
//! that event; the detector keeps polling.

use crate::capture::input::CursorSample;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A finished text selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEvent {
    /// Selected text, trimmed of surrounding whitespace
    pub text: String,
    /// Cursor at the moment the button was released
    pub position: CursorSample,
    /// Wall-clock time of emission
    pub detected_at: DateTime<Utc>,
}

impl SelectionEvent {
    pub fn new(text: String, position: CursorSample) -> Self {
        Self {
            text,
            position,
            detected_at: Utc::now(),
        }
    }

    /// Shortened text for log lines
    pub fn preview(&self) -> String {
        preview(&self.text)
    }
}

const PREVIEW_CHARS: usize = 40;

pub(crate) fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Receiver of emitted selections
pub trait SelectionSink: Send {
    fn deliver(&mut self, event: SelectionEvent);
}

impl<F> SelectionSink for F
where
    F: FnMut(SelectionEvent) + Send,
{
    fn deliver(&mut self, event: SelectionEvent) {
        self(event)
    }
}

impl SelectionSink for tokio::sync::mpsc::UnboundedSender<SelectionEvent> {
    fn deliver(&mut self, event: SelectionEvent) {
        if self.send(event).is_err() {
            tracing::debug!("Selection receiver dropped; event discarded");
        }
    }
}
