//! Wall-clock pacing for continuous runs.
//!
//! The pacer decides, on each control-loop wake, whether enough time has
//! passed since the last dispatched step. It never queues missed intervals:
//! a late tick fires one step, not several.

use std::time::{Duration, Instant};

use crate::config::clamp_rate;

/// Rate limiter keyed on the last dispatched step.
#[derive(Debug, Clone)]
pub struct Pacer {
    rate: u32,
    last_step: Option<Instant>,
}

impl Pacer {
    /// A pacer at `rate` steps per second (clamped to `[1, 30]`).
    #[must_use]
    pub fn new(rate: u32) -> Self {
        Self {
            rate: clamp_rate(rate),
            last_step: None,
        }
    }

    /// Configured steps per second.
    #[must_use]
    pub const fn rate(&self) -> u32 {
        self.rate
    }

    /// Changes the rate; the next `is_due` check uses it.
    ///
    /// Returns the clamped rate.
    pub fn set_rate(&mut self, rate: u32) -> u32 {
        self.rate = clamp_rate(rate);
        self.rate
    }

    /// Minimum spacing between steps, `1000ms / rate`.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.rate
    }

    /// Forgets the last step so the next check fires immediately.
    pub fn restart(&mut self) {
        self.last_step = None;
    }

    /// Returns true if a step may be dispatched at `now`.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_step {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval(),
        }
    }

    /// Records a dispatched step.
    pub fn mark(&mut self, now: Instant) {
        self.last_step = Some(now);
    }
}
