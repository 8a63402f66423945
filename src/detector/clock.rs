//! Time source for the polling loop.

use std::time::{Duration, Instant};

/// Monotonic milliseconds plus a blocking sleep.
pub trait Clock: Send {
    /// Milliseconds elapsed on this clock
    fn now_ms(&self) -> u64;

    /// Block the calling thread
    fn sleep(&self, duration: Duration);
}

/// Wall clock, counting from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<C: Clock + Sync> Clock for std::sync::Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}
