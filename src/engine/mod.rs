//! Background step engine.
//!
//! The engine runs on a dedicated thread and talks to the control context
//! only through two bounded channels. It exclusively owns the dense board
//! of the active session; every payload crossing the channels is a full
//! copy.
//!
//! Commands are processed strictly in send order and each `Step` finishes
//! before the next command is read, so step results come back in request
//! order with no concurrent in-flight steps.

pub mod runtime;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cell::Cell;
use crate::rules::RuleSet;

pub use runtime::{EngineConfig, EngineHandle};

/// Identifies one engine session (a run, or a burst of manual steps).
///
/// Events carry the session that produced them so results that arrive
/// after the session ended can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Control -> engine messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Start a session: build the dense board and adopt `rules`.
    Init {
        /// New session.
        session: SessionId,
        /// Live cells.
        cells: Vec<Cell>,
        /// Board width.
        width: u32,
        /// Board height.
        height: u32,
        /// Rules for subsequent steps.
        rules: RuleSet,
    },
    /// Advance the current board by one generation.
    Step,
    /// Replace the board, keeping the engine's current rules.
    UpdateCells {
        /// Session that owns the new board.
        session: SessionId,
        /// Live cells.
        cells: Vec<Cell>,
        /// Board width.
        width: u32,
        /// Board height.
        height: u32,
    },
    /// Swap rules; applies from the next `Step`.
    SetRules {
        /// New rules.
        rules: RuleSet,
    },
    /// Drop the board of `session` if it is still current. No reply.
    Release {
        /// Session being torn down.
        session: SessionId,
    },
}

impl EngineCommand {
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Step => "step",
            Self::UpdateCells { .. } => "update-cells",
            Self::SetRules { .. } => "set-rules",
            Self::Release { .. } => "release",
        }
    }
}

/// Engine -> control messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// `Init` processed.
    Ready {
        /// Session now held by the engine.
        session: SessionId,
    },
    /// One generation computed.
    StepResult {
        /// Session whose board was stepped.
        session: SessionId,
        /// Live cells of the new generation, row-major.
        cells: Vec<Cell>,
        /// Births in this generation.
        births: u64,
        /// Deaths in this generation.
        deaths: u64,
    },
    /// `UpdateCells` processed.
    CellsUpdated {
        /// Session now held by the engine.
        session: SessionId,
    },
    /// `SetRules` processed.
    RulesUpdated {
        /// Rules now in force.
        rules: RuleSet,
    },
}
