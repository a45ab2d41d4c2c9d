//! The control context: board, rules, pacing and the engine session.
//!
//! `Simulation` is the single writer of the authoritative [`GridState`].
//! The engine thread computes generations on copies; results flow back as
//! events and are published here, in order, by [`Simulation::tick`] and
//! [`Simulation::settle`].
//!
//! Every engine session is tagged with a [`SessionId`]. Stopping a run
//! forgets the session, so results still in the event queue are dropped
//! instead of being applied to a board the user may already be editing.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::SimulationConfig;
use crate::engine::{EngineCommand, EngineConfig, EngineEvent, EngineHandle, SessionId};
use crate::error::{EngineError, LifeResult};
use crate::grid::{EditOutcome, GridState, Statistics};
use crate::pattern::Pattern;
use crate::rules::RuleSet;
use crate::scheduler::{Pacer, SchedulerState};
use crate::snapshot::Snapshot;

/// One published generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationUpdate {
    /// Generation number after the step.
    pub generation: u64,
    /// Births in this step.
    pub births: u64,
    /// Deaths in this step.
    pub deaths: u64,
    /// Live cells after the step.
    pub population: usize,
}

/// A running Life simulation.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    grid: GridState,
    rules: RuleSet,
    state: SchedulerState,
    pacer: Pacer,
    engine: Option<EngineHandle>,
    /// Rules the engine holds, as far as this side knows.
    engine_rules: Option<RuleSet>,
    session: Option<SessionId>,
    /// Steps sent for the current session and not yet published.
    in_flight: usize,
}

impl Simulation {
    /// Validates `config`, builds the board and spawns the engine thread.
    ///
    /// If the engine thread cannot be started the simulation is still
    /// usable for editing; `start` and `step_once` then fail with
    /// [`EngineError::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad config.
    pub fn new(config: SimulationConfig) -> LifeResult<Self> {
        config.validate()?;
        let engine = match EngineHandle::spawn(EngineConfig {
            command_capacity: config.command_capacity,
            event_capacity: config.event_capacity,
        }) {
            Ok(engine) => Some(engine),
            Err(err) => {
                error!(%err, "step engine failed to start; runs are disabled");
                None
            }
        };
        Self::assemble(config, engine)
    }

    fn assemble(config: SimulationConfig, engine: Option<EngineHandle>) -> LifeResult<Self> {
        let rules = RuleSet::parse(&config.rules)?;
        Ok(Self {
            grid: GridState::new(config.width, config.height),
            rules,
            state: SchedulerState::Idle,
            pacer: Pacer::new(config.rate),
            engine,
            engine_rules: None,
            session: None,
            in_flight: 0,
            config,
        })
    }

    /// Current scheduler state.
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// The authoritative board.
    #[must_use]
    pub const fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Rules applied to the next step.
    #[must_use]
    pub const fn rules(&self) -> RuleSet {
        self.rules
    }

    /// Continuous rate in steps per second.
    #[must_use]
    pub const fn rate(&self) -> u32 {
        self.pacer.rate()
    }

    /// Generation counter and statistics.
    #[must_use]
    pub fn stats(&self) -> Statistics {
        self.grid.stats()
    }

    /// The configuration this simulation was built from.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns true if the engine thread is available.
    #[must_use]
    pub fn engine_available(&self) -> bool {
        self.engine.as_ref().is_some_and(EngineHandle::is_alive)
    }

    // ---------------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------------

    fn edit(&mut self, apply: impl FnOnce(&mut GridState) -> EditOutcome) -> EditOutcome {
        if self.state.blocks_edits() {
            debug!(state = %self.state, "edit rejected");
            return EditOutcome::WhileRunning;
        }
        apply(&mut self.grid)
    }

    /// Flips one cell.
    pub fn toggle(&mut self, x: u32, y: u32) -> EditOutcome {
        self.edit(|grid| grid.toggle(x, y))
    }

    /// Sets one cell alive or dead.
    pub fn set_cell(&mut self, x: u32, y: u32, alive: bool) -> EditOutcome {
        self.edit(|grid| grid.set(x, y, alive))
    }

    /// Stamps a pattern with its top-left corner at the anchor, wrapping.
    pub fn place_pattern(&mut self, anchor_x: i64, anchor_y: i64, pattern: &Pattern) -> EditOutcome {
        self.edit(|grid| {
            let added = grid.place_pattern(anchor_x, anchor_y, pattern);
            debug!(pattern = pattern.id, added, "pattern placed");
            EditOutcome::Applied
        })
    }

    /// Changes the board dimensions (clamped to `[10, 1000]`).
    pub fn resize(&mut self, width: u32, height: u32) -> EditOutcome {
        self.edit(|grid| {
            let (w, h) = grid.resize(width, height);
            info!(width = w, height = h, "board resized");
            EditOutcome::Applied
        })
    }

    /// Randomizes the board at `density` using the thread RNG.
    pub fn randomize(&mut self, density: f64) -> EditOutcome {
        let mut rng = rand::rng();
        self.randomize_with(density, &mut rng)
    }

    /// Randomizes the board at the configured default density.
    pub fn randomize_default(&mut self) -> EditOutcome {
        self.randomize(self.config.density)
    }

    /// Randomizes the board at `density` using `rng`.
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) -> EditOutcome {
        self.edit(|grid| {
            grid.randomize(density, rng);
            EditOutcome::Applied
        })
    }

    /// Stops any run, then empties the board and resets statistics.
    pub fn clear(&mut self) {
        self.stop();
        self.grid.clear();
    }

    // ---------------------------------------------------------------------
    // Rules and rate
    // ---------------------------------------------------------------------

    /// Replaces the rules. Takes effect on the next computed generation.
    ///
    /// # Errors
    ///
    /// A rule syntax error leaves the previous rules in force. While a
    /// session is active, a failed hand-off to the engine does too.
    pub fn set_rules(&mut self, text: &str) -> LifeResult<RuleSet> {
        let rules = RuleSet::parse(text)?;
        if self.session.is_some() {
            self.send(EngineCommand::SetRules { rules })?;
            self.engine_rules = Some(rules);
        }
        self.rules = rules;
        info!(%rules, state = %self.state, "rules changed");
        Ok(rules)
    }

    /// Changes the continuous rate; returns the clamped value.
    pub fn set_rate(&mut self, rate: u32) -> u32 {
        let applied = self.pacer.set_rate(rate);
        info!(rate = applied, "rate changed");
        applied
    }

    // ---------------------------------------------------------------------
    // Run control
    // ---------------------------------------------------------------------

    /// Begins a continuous run.
    ///
    /// The run becomes `Running` once the engine acknowledges; the first
    /// step is dispatched on the first tick after that. Starting while
    /// already running is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` during manual stepping; `Unavailable` or
    /// `Disconnected` if the engine is gone (the state stays `Idle`).
    pub fn start(&mut self) -> LifeResult<()> {
        if self.state.is_running() {
            return Ok(());
        }
        if !self.state.accepts_start() {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                requested: "start",
            }
            .into());
        }

        let session = SessionId::new();
        self.send(EngineCommand::Init {
            session,
            cells: self.grid.sorted_cells(),
            width: self.grid.width(),
            height: self.grid.height(),
            rules: self.rules,
        })?;
        self.engine_rules = Some(self.rules);
        self.session = Some(session);
        self.in_flight = 0;
        self.pacer.restart();
        self.state = SchedulerState::Starting;
        info!(%session, rate = self.pacer.rate(), population = self.grid.population(), "simulation starting");
        Ok(())
    }

    /// Ends a run or pending manual steps. Results still in flight are
    /// discarded when they arrive.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Idle {
            return;
        }
        let from = self.state;
        self.state = SchedulerState::Stopping;
        self.end_session();
        info!(%from, generation = self.grid.generation(), "simulation stopped");
    }

    /// Requests one generation.
    ///
    /// From `Idle` this opens a short session seeded with the current
    /// board; further requests before the results arrive are queued
    /// behind it and applied in order. The state returns to `Idle` once
    /// every requested step has been published.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` during a continuous run, or any engine error.
    pub fn step_once(&mut self) -> LifeResult<()> {
        if !self.state.accepts_manual_step() {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                requested: "step",
            }
            .into());
        }

        if self.state == SchedulerState::Idle {
            let session = SessionId::new();
            let (cells, width, height) = (self.grid.sorted_cells(), self.grid.width(), self.grid.height());
            let command = if self.engine_rules == Some(self.rules) {
                EngineCommand::UpdateCells {
                    session,
                    cells,
                    width,
                    height,
                }
            } else {
                EngineCommand::Init {
                    session,
                    cells,
                    width,
                    height,
                    rules: self.rules,
                }
            };
            self.send(command)?;
            self.engine_rules = Some(self.rules);
            self.session = Some(session);
            self.state = SchedulerState::Stepping;
        }

        if let Err(err) = self.send(EngineCommand::Step) {
            if self.state == SchedulerState::Stepping && self.in_flight == 0 {
                self.end_session();
            }
            return Err(err);
        }
        self.in_flight += 1;
        debug!(pending = self.in_flight, "manual step requested");
        Ok(())
    }

    /// [`Simulation::tick_at`] with the current time.
    ///
    /// # Errors
    ///
    /// See [`Simulation::tick_at`].
    pub fn tick(&mut self) -> LifeResult<Vec<GenerationUpdate>> {
        self.tick_at(Instant::now())
    }

    /// One control-loop wake: publishes every result that has arrived,
    /// then dispatches a step if the run is still active, none is in
    /// flight and the pacing interval has elapsed.
    ///
    /// A late wake dispatches one step; missed intervals are not made up.
    ///
    /// # Errors
    ///
    /// `Disconnected` if the engine died; the run is stopped.
    pub fn tick_at(&mut self, now: Instant) -> LifeResult<Vec<GenerationUpdate>> {
        let mut updates = Vec::new();
        self.drain(&mut updates)?;

        if self.state == SchedulerState::Running && self.in_flight == 0 && self.pacer.is_due(now) {
            match self.send(EngineCommand::Step) {
                Ok(()) => {
                    self.in_flight = 1;
                    self.pacer.mark(now);
                    debug!(generation = self.grid.generation(), "step dispatched");
                }
                Err(err) if err.is_retryable() => {
                    warn!(%err, "step not dispatched; retrying next tick");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(updates)
    }

    /// Blocks until no manual step or run start is pending.
    ///
    /// # Errors
    ///
    /// `Timeout` if the engine has not answered within `timeout`.
    pub fn settle(&mut self, timeout: Duration) -> LifeResult<Vec<GenerationUpdate>> {
        let deadline = Instant::now() + timeout;
        let mut updates = Vec::new();
        self.drain(&mut updates)?;

        while matches!(self.state, SchedulerState::Stepping | SchedulerState::Starting) {
            let Some(engine) = self.engine.as_ref() else {
                break;
            };
            match engine.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok(event) => self.handle_event(event, &mut updates),
                Err(EngineError::Timeout { .. }) => {
                    return Err(EngineError::Timeout {
                        duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    }
                    .into());
                }
                Err(err) => {
                    self.engine_lost(&err);
                    return Err(err.into());
                }
            }
        }
        Ok(updates)
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    /// Captures the board and rules, stamped now.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(Utc::now())
    }

    /// Captures the board and rules, stamped `at`.
    #[must_use]
    pub fn snapshot_at(&self, at: DateTime<Utc>) -> Snapshot {
        Snapshot::capture(&self.grid, &self.rules, at)
    }

    /// Replaces the board, generation and rules with `snapshot`.
    ///
    /// Any run is stopped first. Births and deaths reset to zero. Rules
    /// that do not parse fall back to `B3/S23`.
    ///
    /// # Errors
    ///
    /// Rejects a snapshot with out-of-range dimensions; nothing changes.
    pub fn load_snapshot(&mut self, snapshot: &Snapshot) -> LifeResult<()> {
        snapshot.check()?;
        self.stop();
        self.grid
            .load(snapshot.cells.iter().copied(), snapshot.width, snapshot.height, snapshot.generation);
        self.rules = snapshot.parsed_rules();
        info!(
            width = snapshot.width,
            height = snapshot.height,
            generation = snapshot.generation,
            population = self.grid.population(),
            rules = %self.rules,
            "snapshot loaded"
        );
        Ok(())
    }

    /// Parses, validates and loads a JSON snapshot.
    ///
    /// # Errors
    ///
    /// `InvalidSnapshot` with the reason; the current state is untouched.
    pub fn load_json(&mut self, text: &str) -> LifeResult<()> {
        let snapshot = Snapshot::from_json(text)?;
        self.load_snapshot(&snapshot)
    }

    /// Reads and loads a snapshot.
    ///
    /// # Errors
    ///
    /// I/O errors or `InvalidSnapshot`; the current state is untouched.
    pub fn load_from(&mut self, reader: &mut impl Read) -> LifeResult<()> {
        let snapshot = Snapshot::read_from(reader)?;
        self.load_snapshot(&snapshot)
    }

    /// Writes a snapshot of the current board.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors.
    pub fn save_to(&self, writer: &mut impl Write) -> LifeResult<()> {
        self.snapshot().write_to(writer)
    }

    /// Stops any run and joins the engine thread.
    pub fn shutdown(mut self) {
        self.stop();
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }
    }

    // ---------------------------------------------------------------------
    // Engine plumbing
    // ---------------------------------------------------------------------

    fn send(&mut self, command: EngineCommand) -> LifeResult<()> {
        let Some(engine) = self.engine.as_ref() else {
            return Err(EngineError::Unavailable {
                reason: "step engine is not running".to_string(),
            }
            .into());
        };
        match engine.send(command) {
            Ok(()) => Ok(()),
            Err(err @ EngineError::Disconnected { .. }) => {
                self.engine_lost(&err);
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn drain(&mut self, updates: &mut Vec<GenerationUpdate>) -> LifeResult<()> {
        while let Some(engine) = self.engine.as_ref() {
            match engine.try_recv() {
                Ok(Some(event)) => self.handle_event(event, updates),
                Ok(None) => break,
                Err(err) => {
                    self.engine_lost(&err);
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: EngineEvent, updates: &mut Vec<GenerationUpdate>) {
        match event {
            EngineEvent::Ready { session } => {
                if self.session == Some(session) && self.state == SchedulerState::Starting {
                    self.state = SchedulerState::Running;
                    info!(%session, "simulation running");
                } else {
                    debug!(%session, "ready from inactive session");
                }
            }
            EngineEvent::CellsUpdated { session } => {
                debug!(%session, "engine board replaced");
            }
            EngineEvent::RulesUpdated { rules } => {
                debug!(%rules, "engine rules updated");
            }
            EngineEvent::StepResult {
                session,
                cells,
                births,
                deaths,
            } => {
                let live = matches!(self.state, SchedulerState::Running | SchedulerState::Stepping);
                if self.session != Some(session) || !live {
                    warn!(%session, state = %self.state, "discarding stale step result");
                    return;
                }
                self.in_flight = self.in_flight.saturating_sub(1);
                self.grid.publish_generation(cells, births, deaths);
                let update = GenerationUpdate {
                    generation: self.grid.generation(),
                    births,
                    deaths,
                    population: self.grid.population(),
                };
                debug!(
                    generation = update.generation,
                    births, deaths, population = update.population, "generation published"
                );
                updates.push(update);
                if self.state == SchedulerState::Stepping && self.in_flight == 0 {
                    self.end_session();
                }
            }
        }
    }

    /// Forgets the current session and returns to `Idle`.
    fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            if let Some(engine) = self.engine.as_ref() {
                if let Err(err) = engine.send(EngineCommand::Release { session }) {
                    debug!(%session, %err, "release not delivered");
                }
            }
        }
        self.in_flight = 0;
        self.state = SchedulerState::Idle;
    }

    fn engine_lost(&mut self, err: &EngineError) {
        warn!(%err, "step engine lost; returning to idle");
        self.engine = None;
        self.engine_rules = None;
        self.session = None;
        self.in_flight = 0;
        self.state = SchedulerState::Idle;
    }
}
