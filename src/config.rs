//! Simulation configuration and board/pacing limits.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::rules::RuleSet;

/// Smallest accepted board width or height.
pub const MIN_DIMENSION: u32 = 10;
/// Largest accepted board width or height.
pub const MAX_DIMENSION: u32 = 1000;
/// Slowest continuous rate, in steps per second.
pub const MIN_RATE: u32 = 1;
/// Fastest continuous rate, in steps per second.
pub const MAX_RATE: u32 = 30;

/// Clamps a board dimension to `[MIN_DIMENSION, MAX_DIMENSION]`.
#[must_use]
pub fn clamp_dimension(value: u32) -> u32 {
    value.clamp(MIN_DIMENSION, MAX_DIMENSION)
}

/// Clamps a rate to `[MIN_RATE, MAX_RATE]`.
#[must_use]
pub fn clamp_rate(value: u32) -> u32 {
    value.clamp(MIN_RATE, MAX_RATE)
}

/// Host-facing simulation configuration.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a single setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Initial board width.
    pub width: u32,
    /// Initial board height.
    pub height: u32,
    /// Initial rule notation.
    pub rules: String,
    /// Continuous rate in steps per second.
    pub rate: u32,
    /// Live probability used by `randomize` when the host does not pass one.
    pub density: f64,
    /// Max queued control -> engine messages.
    pub command_capacity: usize,
    /// Max queued engine -> control messages.
    pub event_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            rules: "B3/S23".to_string(),
            rate: 10,
            density: 0.3,
            command_capacity: 64,
            event_capacity: 64,
        }
    }
}

impl SimulationConfig {
    /// Validate the configuration.
    ///
    /// This must be called before constructing a `Simulation` from host input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
                return Err(ValidationError::InvalidConfig {
                    field,
                    reason: format!("{value} is outside [{MIN_DIMENSION}, {MAX_DIMENSION}]"),
                });
            }
        }
        if !(MIN_RATE..=MAX_RATE).contains(&self.rate) {
            return Err(ValidationError::InvalidConfig {
                field: "rate",
                reason: format!("{} is outside [{MIN_RATE}, {MAX_RATE}]", self.rate),
            });
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(ValidationError::InvalidConfig {
                field: "density",
                reason: format!("{} is outside [0, 1]", self.density),
            });
        }
        if let Err(err) = self.rules.parse::<RuleSet>() {
            return Err(ValidationError::InvalidConfig {
                field: "rules",
                reason: err.to_string(),
            });
        }
        if self.command_capacity == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "command_capacity",
                reason: "must be > 0".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "event_capacity",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
