//! Error types for gridlife.
//!
//! All errors in gridlife are strongly typed using thiserror.
//! Rule and snapshot errors are recovered where they occur; only engine
//! failures are meant to be escalated to the host as actionable.
//!
//! Edits that target stale coordinates or arrive while a run is active are
//! not errors at all: they are reported through [`crate::grid::EditOutcome`].

use std::fmt;

use thiserror::Error;

use crate::scheduler::SchedulerState;

/// Rule notation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Invalid rule syntax '{input}': {reason}")]
    InvalidRuleSyntax {
        input: String,
        reason: String,
    },
}

/// Why a persisted snapshot was rejected.
///
/// There is one variant per validation check so the host can tell the user
/// exactly which field is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotRejection {
    /// The document is not valid JSON.
    Malformed {
        /// Parser message.
        message: String,
    },
    /// The top-level value is not a JSON object.
    NotAnObject,
    /// `width` or `height` is missing or not an integer.
    InvalidDimensions,
    /// `width` or `height` is outside `[10, 1000]`.
    DimensionsOutOfRange {
        /// Width as found in the document.
        width: i64,
        /// Height as found in the document.
        height: i64,
    },
    /// `rules` is missing or not a string.
    InvalidRules,
    /// `cells` is missing or not a list.
    InvalidCells,
    /// A `cells` entry is neither an `"x,y"` string nor an `[x, y]` pair.
    InvalidCell {
        /// The offending entry, rendered as JSON.
        entry: String,
    },
}

impl fmt::Display for SnapshotRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "malformed snapshot: {message}"),
            Self::NotAnObject => write!(f, "invalid data format"),
            Self::InvalidDimensions => write!(f, "invalid board dimensions"),
            Self::DimensionsOutOfRange { width, height } => write!(
                f,
                "board dimensions {width}x{height} out of range ({}-{})",
                crate::config::MIN_DIMENSION,
                crate::config::MAX_DIMENSION
            ),
            Self::InvalidRules => write!(f, "invalid rules format"),
            Self::InvalidCells => write!(f, "invalid cells data"),
            Self::InvalidCell { entry } => write!(f, "invalid cell entry {entry}"),
        }
    }
}

/// Snapshot load errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot {
        reason: SnapshotRejection,
    },
}

impl SnapshotError {
    /// Returns the specific rejection reason.
    #[must_use]
    pub const fn reason(&self) -> &SnapshotRejection {
        match self {
            Self::InvalidSnapshot { reason } => reason,
        }
    }
}

impl From<SnapshotRejection> for SnapshotError {
    fn from(reason: SnapshotRejection) -> Self {
        Self::InvalidSnapshot { reason }
    }
}

/// Background engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine unavailable: {reason}")]
    Unavailable {
        reason: String,
    },

    #[error("Engine channel disconnected: {path}")]
    Disconnected {
        path: String,
    },

    #[error("Engine command queue full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Engine did not respond within {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Cannot {requested} while scheduler is {from}")]
    InvalidTransition {
        from: SchedulerState,
        requested: &'static str,
    },
}

/// Validation errors for configuration input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid configuration field '{field}': {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
}

/// Top-level error type for gridlife.
#[derive(Debug, Error)]
pub enum LifeError {
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LifeError {
    /// Returns true if this is a rule notation error.
    #[must_use]
    pub const fn is_rule(&self) -> bool {
        matches!(self, Self::Rule(_))
    }

    /// Returns true if this is a snapshot validation error.
    #[must_use]
    pub const fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }

    /// Returns true if this is an engine error.
    #[must_use]
    pub const fn is_engine(&self) -> bool {
        matches!(self, Self::Engine(_))
    }

    /// Returns true if the engine is gone and runs must fail closed.
    #[must_use]
    pub const fn is_engine_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Engine(EngineError::Unavailable { .. } | EngineError::Disconnected { .. })
        )
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Engine(e) => matches!(e, EngineError::QueueFull { .. } | EngineError::Timeout { .. }),
            Self::Rule(_) | Self::Snapshot(_) | Self::Validation(_) | Self::Io(_) => false,
        }
    }
}

impl From<SnapshotRejection> for LifeError {
    fn from(reason: SnapshotRejection) -> Self {
        Self::Snapshot(SnapshotError::InvalidSnapshot { reason })
    }
}

/// Result type alias for gridlife operations.
pub type LifeResult<T> = Result<T, LifeError>;
