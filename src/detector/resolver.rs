//! Selection resolution
//!
//! Runs only for candidate selections. After a short settle delay (some
//! applications finalise their selection asynchronously after the button
//! comes up), reads the selected text under the release point and applies
//! the emission filters:
//!
//! 1. the trimmed text is non-empty
//! 2. it differs from the last emitted text
//! 3. identical text inside the cooldown window is reported separately,
//!    but different text is never held back by the cooldown
//!
//! [`DetectorMemory`] is committed before the event is delivered, so a
//! consumer that resets it from inside the sink is not overwritten. A
//! panicking sink loses that one event, nothing more.

use crate::capture::accessibility::{lookup_selected_text, AccessibilityProvider, QueryError};
use crate::capture::input::CursorSample;
use crate::detector::clock::Clock;
use crate::detector::sink::{preview, SelectionEvent, SelectionSink};
use parking_lot::Mutex as ParkingMutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// De-duplication state, kept for the lifetime of the detector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorMemory {
    pub last_emitted_text: String,
    pub last_emit_time_ms: u64,
}

pub type SharedMemory = Arc<ParkingMutex<DetectorMemory>>;

/// Clears the last emitted text so identical text can fire again.
///
/// Cheap to clone; safe to call from any thread, including from inside a
/// [`SelectionSink`].
#[derive(Debug, Clone)]
pub struct ResetHandle {
    memory: SharedMemory,
}

impl ResetHandle {
    pub(crate) fn new(memory: SharedMemory) -> Self {
        Self { memory }
    }

    pub fn reset_last_selected(&self) {
        self.memory.lock().last_emitted_text.clear();
        debug!("Last selected text cleared by consumer");
    }
}

/// What happened to a candidate selection
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Emitted(SelectionEvent),
    /// Accessibility layer produced nothing
    NoText(QueryError),
    /// Text was whitespace only
    Empty,
    /// Same as the last emitted text
    Duplicate,
    /// Same as the last emitted text, within the cooldown window
    CoolingDown,
}

pub struct SelectionResolver<P> {
    provider: P,
    memory: SharedMemory,
    settle_delay: Duration,
    cooldown_ms: u64,
}

impl<P: AccessibilityProvider> SelectionResolver<P> {
    pub fn new(provider: P, memory: SharedMemory, settle_delay: Duration, cooldown_ms: u64) -> Self {
        Self {
            provider,
            memory,
            settle_delay,
            cooldown_ms,
        }
    }

    pub fn reset_handle(&self) -> ResetHandle {
        ResetHandle::new(self.memory.clone())
    }

    pub fn memory(&self) -> DetectorMemory {
        self.memory.lock().clone()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve the selection at `release`, delivering to `sink` on success.
    ///
    /// Blocks for the settle delay. `release.timestamp_ms` is used as the
    /// emission time for cooldown bookkeeping.
    pub fn resolve<C, S>(&self, release: CursorSample, clock: &C, sink: &mut S) -> Resolution
    where
        C: Clock + ?Sized,
        S: SelectionSink + ?Sized,
    {
        debug!("Waiting {:?} for the selection to settle", self.settle_delay);
        clock.sleep(self.settle_delay);

        let found = match lookup_selected_text(&self.provider, release.x, release.y) {
            Ok(found) => found,
            Err(e) => {
                match &e {
                    QueryError::Platform(_) => warn!("Selection lookup failed: {}", e),
                    _ => debug!("No selected text at ({}, {}): {}", release.x, release.y, e),
                }
                return Resolution::NoText(e);
            }
        };

        let text = found.text.trim();
        debug!(
            "Read {} chars from {:?}: {:?}",
            text.chars().count(),
            found.source,
            preview(text)
        );

        let resolution = self.admit(text, release);
        match &resolution {
            Resolution::Emitted(event) => {
                info!(
                    "Selection detected at ({}, {}): {:?}",
                    release.x,
                    release.y,
                    event.preview()
                );
                let delivered =
                    panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(event.clone())));
                if delivered.is_err() {
                    error!("Selection sink panicked; event dropped");
                }
            }
            Resolution::Empty => debug!("Selected text is blank; ignored"),
            Resolution::Duplicate => debug!("Selected text unchanged since last emission; ignored"),
            Resolution::CoolingDown => debug!("Selected text repeated within cooldown; ignored"),
            Resolution::NoText(_) => {}
        }
        resolution
    }

    /// Apply the emission filters and commit memory when they pass.
    fn admit(&self, text: &str, release: CursorSample) -> Resolution {
        if text.is_empty() {
            return Resolution::Empty;
        }

        let mut memory = self.memory.lock();
        if memory.last_emitted_text == text {
            let elapsed = release.timestamp_ms.saturating_sub(memory.last_emit_time_ms);
            return if elapsed <= self.cooldown_ms {
                Resolution::CoolingDown
            } else {
                Resolution::Duplicate
            };
        }

        memory.last_emitted_text = text.to_string();
        memory.last_emit_time_ms = release.timestamp_ms;
        Resolution::Emitted(SelectionEvent::new(text.to_string(), release))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::accessibility::{AccessibleElement, QueryResult};
    use std::cell::{Cell, RefCell};

    struct Element(QueryResult<String>);

    impl AccessibleElement for Element {
        fn selected_text(&self) -> QueryResult<String> {
            self.0.clone()
        }

        fn children(&self) -> QueryResult<Vec<Self>> {
            Ok(Vec::new())
        }
    }

    struct Scripted {
        next: RefCell<QueryResult<String>>,
        queries: Cell<usize>,
    }

    impl AccessibilityProvider for Scripted {
        type Element = Element;

        fn element_at(&self, _x: i32, _y: i32) -> QueryResult<Element> {
            self.queries.set(self.queries.get() + 1);
            Ok(Element(self.next.borrow().clone()))
        }
    }

    struct NoSleep {
        slept: RefCell<Vec<Duration>>,
    }

    impl Clock for NoSleep {
        fn now_ms(&self) -> u64 {
            0
        }

        fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
        }
    }

    fn resolver(text: QueryResult<String>) -> SelectionResolver<Scripted> {
        SelectionResolver::new(
            Scripted {
                next: RefCell::new(text),
                queries: Cell::new(0),
            },
            SharedMemory::default(),
            Duration::from_millis(500),
            1000,
        )
    }

    fn set_text(resolver: &SelectionResolver<Scripted>, text: &str) {
        *resolver.provider.next.borrow_mut() = Ok(text.to_string());
    }

    fn clock() -> NoSleep {
        NoSleep {
            slept: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_emits_and_waits_settle_delay() {
        let resolver = resolver(Ok("Hello World".into()));
        let clock = clock();
        let mut events = Vec::new();
        let mut sink = |e: SelectionEvent| events.push(e);

        let resolution = resolver.resolve(CursorSample::new(100, 200, 300), &clock, &mut sink);
        assert!(matches!(resolution, Resolution::Emitted(_)));
        assert_eq!(*clock.slept.borrow(), vec![Duration::from_millis(500)]);
        drop(sink);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Hello World");
        assert_eq!((events[0].position.x, events[0].position.y), (100, 200));
        assert_eq!(
            resolver.memory(),
            DetectorMemory {
                last_emitted_text: "Hello World".into(),
                last_emit_time_ms: 300,
            }
        );
    }

    #[test]
    fn test_whitespace_is_not_emitted_and_memory_untouched() {
        let resolver = resolver(Ok("  \n\t ".into()));
        let mut sink = |_: SelectionEvent| panic!("must not emit");
        let resolution = resolver.resolve(CursorSample::new(0, 0, 10), &clock(), &mut sink);
        assert_eq!(resolution, Resolution::Empty);
        assert_eq!(resolver.memory(), DetectorMemory::default());
    }

    #[test]
    fn test_query_failure_is_no_text() {
        let resolver = resolver(Err(QueryError::PatternUnsupported));
        let mut sink = |_: SelectionEvent| panic!("must not emit");
        let resolution = resolver.resolve(CursorSample::new(0, 0, 10), &clock(), &mut sink);
        assert_eq!(resolution, Resolution::NoText(QueryError::PatternUnsupported));
        assert_eq!(resolver.memory(), DetectorMemory::default());
    }

    #[test]
    fn test_identical_text_is_suppressed_regardless_of_time() {
        let resolver = resolver(Ok("Same Text".into()));
        let clock = clock();
        let mut count = 0;
        let mut sink = |_: SelectionEvent| count += 1;

        assert!(matches!(
            resolver.resolve(CursorSample::new(0, 0, 0), &clock, &mut sink),
            Resolution::Emitted(_)
        ));
        assert_eq!(
            resolver.resolve(CursorSample::new(0, 0, 300), &clock, &mut sink),
            Resolution::CoolingDown
        );
        assert_eq!(
            resolver.resolve(CursorSample::new(0, 0, 1600), &clock, &mut sink),
            Resolution::Duplicate
        );
        drop(sink);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_different_text_inside_cooldown_emits() {
        let resolver = resolver(Ok("A".into()));
        let clock = clock();
        let mut texts = Vec::new();
        let mut sink = |e: SelectionEvent| texts.push(e.text);

        resolver.resolve(CursorSample::new(0, 0, 0), &clock, &mut sink);
        set_text(&resolver, "B");
        resolver.resolve(CursorSample::new(0, 0, 200), &clock, &mut sink);
        drop(sink);

        assert_eq!(texts, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_reset_allows_identical_text_again() {
        let resolver = resolver(Ok("Same".into()));
        let clock = clock();
        let reset = resolver.reset_handle();
        let mut count = 0;
        let mut sink = |_: SelectionEvent| count += 1;

        resolver.resolve(CursorSample::new(0, 0, 0), &clock, &mut sink);
        reset.reset_last_selected();
        assert!(matches!(
            resolver.resolve(CursorSample::new(0, 0, 100), &clock, &mut sink),
            Resolution::Emitted(_)
        ));
        drop(sink);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_reset_inside_sink_sticks() {
        let resolver = resolver(Ok("Same".into()));
        let reset = resolver.reset_handle();
        let mut sink = move |_: SelectionEvent| reset.reset_last_selected();

        resolver.resolve(CursorSample::new(0, 0, 0), &clock(), &mut sink);
        assert_eq!(resolver.memory().last_emitted_text, "");
    }

    #[test]
    fn test_panicking_sink_does_not_escape() {
        let resolver = resolver(Ok("first".into()));
        let clock = clock();
        let mut sink = |_: SelectionEvent| panic!("consumer bug");

        assert!(matches!(
            resolver.resolve(CursorSample::new(0, 0, 0), &clock, &mut sink),
            Resolution::Emitted(_)
        ));
        set_text(&resolver, "second");
        assert!(matches!(
            resolver.resolve(CursorSample::new(0, 0, 300), &clock, &mut sink),
            Resolution::Emitted(_)
        ));
        assert_eq!(resolver.memory().last_emitted_text, "second");
        assert_eq!(resolver.provider.queries.get(), 2);
    }

    #[test]
    fn test_event_text_is_trimmed() {
        let resolver = resolver(Ok("  padded  ".into()));
        let mut texts = Vec::new();
        let mut sink = |e: SelectionEvent| texts.push(e.text);
        resolver.resolve(CursorSample::new(0, 0, 0), &clock(), &mut sink);
        drop(sink);
        assert_eq!(texts, vec!["padded".to_string()]);
    }
}
