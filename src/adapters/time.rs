//! Monotonic clock adapter.
//!
//! Implements [`Clock`] over `std::time::Instant` for host-side runs and
//! simulation.  The millisecond counter is truncated to `u32` and wraps
//! after ~49.7 days, exactly like the firmware's `millis()`.

use std::time::Instant;

use crate::app::ports::Clock;

pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
