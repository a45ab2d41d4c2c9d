//! Simulation scheduler state machine.
//!
//! ```text
//!            start             Ready
//!   Idle ──────────► Starting ───────► Running
//!    ▲  │                                 │
//!    │  │ step_once                       │ stop
//!    │  ▼                                 ▼
//!    │ Stepping ──(all results)──► Idle ◄─ Stopping
//! ```
//!
//! The transitions themselves are driven by [`crate::Simulation`]; this
//! module only names the states and answers what each state permits.

pub mod pacing;

use std::fmt;

pub use pacing::Pacer;

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedulerState {
    /// No session; edits allowed.
    #[default]
    Idle,
    /// `Init` sent, waiting for `Ready`.
    Starting,
    /// Continuous stepping.
    Running,
    /// Manual steps in flight.
    Stepping,
    /// Tearing down a run.
    Stopping,
}

impl SchedulerState {
    /// Returns true while board edits must be rejected.
    #[must_use]
    pub const fn blocks_edits(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Returns true while a continuous run is active.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    /// Returns true if a manual step may be requested.
    #[must_use]
    pub const fn accepts_manual_step(self) -> bool {
        matches!(self, Self::Idle | Self::Stepping)
    }

    /// Returns true if a continuous run may be started.
    #[must_use]
    pub const fn accepts_start(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stepping => "stepping",
            Self::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_allows_edits() {
        assert!(!SchedulerState::Idle.blocks_edits());
        for s in [
            SchedulerState::Starting,
            SchedulerState::Running,
            SchedulerState::Stepping,
            SchedulerState::Stopping,
        ] {
            assert!(s.blocks_edits(), "{s}");
        }
    }

    #[test]
    fn manual_step_not_allowed_while_running() {
        assert!(SchedulerState::Idle.accepts_manual_step());
        assert!(SchedulerState::Stepping.accepts_manual_step());
        assert!(!SchedulerState::Running.accepts_manual_step());
        assert!(!SchedulerState::Starting.accepts_manual_step());
    }

    #[test]
    fn start_only_from_idle() {
        assert!(SchedulerState::Idle.accepts_start());
        assert!(!SchedulerState::Stepping.accepts_start());
        assert!(!SchedulerState::Running.accepts_start());
    }
}
