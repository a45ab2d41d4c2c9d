//! # gridlife - Toroidal Life-like cellular automata
//!
//! gridlife runs any B/S ("Life-like") rule on a wrapping rectangular board.
//! Generations are computed on a dedicated engine thread; the control
//! context owns the authoritative board, paces continuous runs and publishes
//! results in order.
//!
//! ## Core Concepts
//!
//! - **RuleSet**: Birth and survival neighbor counts, written `B3/S23`
//! - **GridState**: Live cells, dimensions, generation and statistics
//! - **Step**: One synchronous generation on a torus
//! - **Simulation**: Scheduler, pacing and the engine session
//! - **Snapshot**: The persisted JSON form of a board
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use gridlife::{pattern, Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! let _ = sim.place_pattern(10, 10, &pattern::GLIDER);
//! sim.set_rules("B36/S23")?;
//!
//! sim.step_once()?;
//! for update in sim.settle(Duration::from_secs(1))? {
//!     println!("generation {} population {}", update.generation, update.population);
//! }
//! # Ok::<(), gridlife::LifeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod cell;
pub mod config;
pub mod error;
pub mod pattern;
pub mod rules;

// Board and stepping
pub mod grid;
pub mod step;

// Execution
pub mod engine;
pub mod scheduler;
pub mod simulation;
pub mod snapshot;

pub use cell::{Cell, CellKeyError};
pub use config::SimulationConfig;
pub use engine::{EngineCommand, EngineEvent, EngineHandle, SessionId};
pub use error::{
    EngineError, LifeError, LifeResult, RuleError, SnapshotError, SnapshotRejection, ValidationError,
};
pub use grid::{CellSet, DenseBoard, EditOutcome, GridState, Statistics};
pub use pattern::{Pattern, PATTERNS};
pub use rules::{find_preset, NeighborCounts, RulePreset, RuleSet, PRESETS};
pub use scheduler::{Pacer, SchedulerState};
pub use simulation::{GenerationUpdate, Simulation};
pub use snapshot::{snapshot_filename, Snapshot, SNAPSHOT_VERSION};
pub use step::{step, StepOutcome};
