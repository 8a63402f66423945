//! Selection detector
//!
//! [`Pipeline`] is one Sampler -> Classifier -> Resolver pass per tick.
//! [`SelectionDetector`] owns the polling thread that drives it.
//!
//! The platform sampler and accessibility provider are built *on* the
//! polling thread, because the accessibility layer is thread-affine.
//! Their construction result is handed back to [`SelectionDetector::start`]
//! so setup failures (no accessibility permission, unsupported platform)
//! surface to the caller instead of silently killing the thread.

pub mod clock;
pub mod error;
pub mod gesture;
pub mod resolver;
pub mod sink;

pub use clock::{Clock, SystemClock};
pub use error::{DetectorError, DetectorResult};
pub use gesture::{Gesture, GestureClassifier, GestureState};
pub use resolver::{DetectorMemory, ResetHandle, Resolution, SelectionResolver, SharedMemory};
pub use sink::{SelectionEvent, SelectionSink};

use crate::capture::{self, AccessibilityProvider, InputSampler};
use crate::config::DetectorConfig;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Result of a single poll tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A previous tick was still in progress
    Busy,
    /// The pointer could not be read this tick
    SampleFailed,
    /// A backend panicked; the tick was abandoned
    Panicked,
    /// Input observed; nothing to resolve
    Observed(Gesture),
    /// A candidate selection was resolved
    Resolved(Resolution),
}

/// Clears the busy flag when the tick ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Clears the running flag when the polling thread exits, however it exits.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One detector instance's sampler, classifier, and resolver
pub struct Pipeline<S, P, C> {
    sampler: S,
    classifier: GestureClassifier,
    resolver: SelectionResolver<P>,
    clock: C,
    busy: AtomicBool,
    /// Consecutive ticks whose pointer read failed
    sample_failures: u32,
}

impl<S, P, C> Pipeline<S, P, C>
where
    S: InputSampler,
    P: AccessibilityProvider,
    C: Clock,
{
    pub fn new(config: &DetectorConfig, sampler: S, provider: P, clock: C, memory: SharedMemory) -> Self {
        Self {
            sampler,
            classifier: GestureClassifier::new(config.drag_threshold_px),
            resolver: SelectionResolver::new(
                provider,
                memory,
                config.settle_delay(),
                config.cooldown_ms,
            ),
            clock,
            busy: AtomicBool::new(false),
            sample_failures: 0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn reset_handle(&self) -> ResetHandle {
        self.resolver.reset_handle()
    }

    pub fn memory(&self) -> DetectorMemory {
        self.resolver.memory()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.classifier.state()
    }

    /// Sample input, classify, and resolve a candidate selection if any.
    pub fn tick<K: SelectionSink + ?Sized>(&mut self, sink: &mut K) -> TickOutcome {
        if self.busy.swap(true, Ordering::AcqRel) {
            trace!("Previous tick still running; skipping");
            return TickOutcome::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        let now_ms = self.clock.now_ms();
        let sample = match capture::input::sample(&mut self.sampler, now_ms) {
            Ok(sample) => sample,
            Err(e) => {
                self.sample_failures = self.sample_failures.saturating_add(1);
                if self.sample_failures == 1 {
                    warn!("Failed to sample pointer: {}", e);
                } else {
                    debug!("Failed to sample pointer ({} in a row): {}", self.sample_failures, e);
                }
                return TickOutcome::SampleFailed;
            }
        };
        if self.sample_failures > 0 {
            info!("Pointer sampling recovered after {} failed ticks", self.sample_failures);
            self.sample_failures = 0;
        }
        trace!(
            "Tick at {}ms: ({}, {}) down={}",
            now_ms,
            sample.cursor.x,
            sample.cursor.y,
            sample.primary_down
        );

        match self.classifier.observe(&sample) {
            Gesture::Candidate { release, .. } => {
                TickOutcome::Resolved(self.resolver.resolve(release, &self.clock, sink))
            }
            other => TickOutcome::Observed(other),
        }
    }

    /// One iteration of the polling loop: tick, then sleep whatever is
    /// left of `poll_interval`. A tick that overran the interval is
    /// followed immediately by the next one.
    pub fn poll_once<K: SelectionSink + ?Sized>(
        &mut self,
        sink: &mut K,
        poll_interval: Duration,
    ) -> TickOutcome {
        let tick_start = self.clock.now_ms();

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.tick(sink))) {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Detector tick panicked; continuing");
                TickOutcome::Panicked
            }
        };

        let elapsed = Duration::from_millis(self.clock.now_ms().saturating_sub(tick_start));
        if elapsed < poll_interval {
            self.clock.sleep(poll_interval - elapsed);
        }
        outcome
    }
}

/// Handle to a running detector
///
/// Dropping the handle stops the polling thread.
pub struct SelectionDetector {
    running: Arc<AtomicBool>,
    reset: ResetHandle,
    thread_handle: Option<JoinHandle<()>>,
}

impl SelectionDetector {
    /// Start polling with the platform's input and accessibility backends.
    pub fn start<K>(config: DetectorConfig, sink: K) -> DetectorResult<Self>
    where
        K: SelectionSink + 'static,
    {
        Self::start_with(
            config,
            capture::platform_sampler,
            capture::platform_accessibility,
            SystemClock::new(),
            sink,
        )
    }

    /// Start polling with caller-supplied backends.
    ///
    /// `make_sampler` and `make_provider` run on the polling thread; an
    /// error from either is returned here and no polling takes place.
    pub fn start_with<S, P, C, K, FS, FP>(
        config: DetectorConfig,
        make_sampler: FS,
        make_provider: FP,
        clock: C,
        sink: K,
    ) -> DetectorResult<Self>
    where
        S: InputSampler + 'static,
        P: AccessibilityProvider + 'static,
        C: Clock + 'static,
        K: SelectionSink + 'static,
        FS: FnOnce() -> DetectorResult<S> + Send + 'static,
        FP: FnOnce() -> DetectorResult<P> + Send + 'static,
    {
        config.validate()?;

        let memory = SharedMemory::default();
        let reset = ResetHandle::new(memory.clone());
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::channel::<DetectorResult<()>>();

        let thread_running = running.clone();
        let handle = thread::Builder::new()
            .name("selection-detector".into())
            .spawn(move || {
                let _exit = RunningGuard(thread_running.clone());
                let backends = make_sampler().and_then(|sampler| Ok((sampler, make_provider()?)));
                let (sampler, provider) = match backends {
                    Ok(backends) => backends,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                let pipeline = Pipeline::new(&config, sampler, provider, clock, memory);
                run_poll_loop(pipeline, sink, thread_running, config.poll_interval());
            })
            .map_err(|e| DetectorError::ThreadSpawn(e.to_string()))?;

        let startup = ready_rx.recv().unwrap_or_else(|_| {
            Err(DetectorError::PlatformError(
                "Polling thread exited during startup".to_string(),
            ))
        });

        if let Err(e) = startup {
            running.store(false, Ordering::SeqCst);
            let _ = handle.join();
            error!("Selection detector failed to start: {}", e);
            return Err(e);
        }

        Ok(Self {
            running,
            reset,
            thread_handle: Some(handle),
        })
    }

    /// Stop polling and wait for the thread to exit. Idempotent.
    ///
    /// A resolution in progress finishes before the thread exits.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) && self.thread_handle.is_none() {
            return;
        }

        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                error!("Selection detector thread panicked");
            }
        }
    }

    /// False once stopped, or if the polling thread has exited on its own
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Forget the last emitted text so identical text can fire again
    pub fn reset_last_selected(&self) {
        self.reset.reset_last_selected();
    }

    /// Reset hook that can be moved to the consumer
    pub fn reset_handle(&self) -> ResetHandle {
        self.reset.clone()
    }
}

impl Drop for SelectionDetector {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_poll_loop<S, P, C, K>(
    mut pipeline: Pipeline<S, P, C>,
    mut sink: K,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
) where
    S: InputSampler,
    P: AccessibilityProvider,
    C: Clock,
    K: SelectionSink,
{
    info!(
        "Selection detector started (poll_interval={:?})",
        poll_interval
    );

    while running.load(Ordering::SeqCst) {
        pipeline.poll_once(&mut sink, poll_interval);
    }

    info!("Selection detector stopped");
}
