//! Engine thread and its channel handle.
//!
//! The handle never blocks the control context on send: commands go through
//! `try_send` and a full queue is reported as `QueueFull`. The worker blocks
//! on `recv()` between commands, so shutdown is just closing the channels
//! and joining.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::grid::DenseBoard;
use crate::rules::RuleSet;
use crate::step::step;

use super::{EngineCommand, EngineEvent, SessionId};

/// Engine channel configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Maximum queued control -> engine commands.
    pub command_capacity: usize,
    /// Maximum queued engine -> control events.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_capacity: 64,
            event_capacity: 64,
        }
    }
}

/// State owned by the engine thread.
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    session: Option<SessionId>,
    board: Option<DenseBoard>,
    rules: RuleSet,
}

impl EngineState {
    /// Applies one command; returns the reply, if the command has one.
    pub(crate) fn handle(&mut self, command: EngineCommand) -> Option<EngineEvent> {
        match command {
            EngineCommand::Init {
                session,
                cells,
                width,
                height,
                rules,
            } => {
                self.board = Some(DenseBoard::from_cells(cells, width, height));
                self.session = Some(session);
                self.rules = rules;
                Some(EngineEvent::Ready { session })
            }
            EngineCommand::Step => {
                let (Some(session), Some(board)) = (self.session, self.board.as_ref()) else {
                    warn!("step requested with no board loaded; ignoring");
                    return None;
                };
                let outcome = step(board, &self.rules);
                let cells = outcome.board.to_cells();
                self.board = Some(outcome.board);
                Some(EngineEvent::StepResult {
                    session,
                    cells,
                    births: outcome.births,
                    deaths: outcome.deaths,
                })
            }
            EngineCommand::UpdateCells {
                session,
                cells,
                width,
                height,
            } => {
                self.board = Some(DenseBoard::from_cells(cells, width, height));
                self.session = Some(session);
                Some(EngineEvent::CellsUpdated { session })
            }
            EngineCommand::SetRules { rules } => {
                self.rules = rules;
                Some(EngineEvent::RulesUpdated { rules })
            }
            EngineCommand::Release { session } => {
                if self.session == Some(session) {
                    self.session = None;
                    self.board = None;
                }
                None
            }
        }
    }
}

fn worker_loop(commands: Receiver<EngineCommand>, events: Sender<EngineEvent>) {
    let mut state = EngineState::default();
    while let Ok(command) = commands.recv() {
        debug!(command = command.kind(), "engine command");
        if let Some(event) = state.handle(command) {
            if events.send(event).is_err() {
                // Control side is gone.
                break;
            }
        }
    }
    debug!("engine thread exiting");
}

/// Control-side handle to the engine thread.
#[derive(Debug)]
pub struct EngineHandle {
    tx: Sender<EngineCommand>,
    rx: Receiver<EngineEvent>,
    worker: Option<JoinHandle<()>>,
    command_capacity: usize,
}

impl EngineHandle {
    /// Spawns the engine thread.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] if the thread cannot be spawned.
    pub fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        let command_capacity = config.command_capacity.max(1);
        let (tx, commands) = bounded::<EngineCommand>(command_capacity);
        let (events, rx) = bounded::<EngineEvent>(config.event_capacity.max(1));

        let worker = thread::Builder::new()
            .name("gridlife-engine".to_string())
            .spawn(move || worker_loop(commands, events))
            .map_err(|e| EngineError::Unavailable {
                reason: format!("failed to spawn engine thread: {e}"),
            })?;

        Ok(Self {
            tx,
            rx,
            worker: Some(worker),
            command_capacity,
        })
    }

    /// Queues a command without blocking.
    ///
    /// # Errors
    ///
    /// `QueueFull` if the engine is behind, `Disconnected` if it is gone.
    pub fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        match self.tx.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(EngineError::QueueFull {
                capacity: self.command_capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(EngineError::Disconnected {
                path: "engine_commands".to_string(),
            }),
        }
    }

    /// Takes the next event if one is ready.
    ///
    /// # Errors
    ///
    /// `Disconnected` if the engine thread is gone and nothing is buffered.
    pub fn try_recv(&self) -> Result<Option<EngineEvent>, EngineError> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EngineError::Disconnected {
                path: "engine_events".to_string(),
            }),
        }
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// # Errors
    ///
    /// `Timeout` or `Disconnected`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, EngineError> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => EngineError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            RecvTimeoutError::Disconnected => EngineError::Disconnected {
                path: "engine_events".to_string(),
            },
        })
    }

    /// Returns true while the engine thread is running.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Closes both channels and joins the engine thread.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        // Drop our ends first: a worker blocked on recv sees Disconnected and
        // one blocked on a full event queue sees its send fail.
        let tx = std::mem::replace(&mut self.tx, bounded::<EngineCommand>(1).0);
        drop(tx);
        let rx = std::mem::replace(&mut self.rx, bounded::<EngineEvent>(1).1);
        drop(rx);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("engine thread panicked");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        // Channels with no engine behind them.
        let (tx, _) = bounded::<EngineCommand>(1);
        let (_, rx) = bounded::<EngineEvent>(1);
        Self {
            tx,
            rx,
            worker: None,
            command_capacity: 1,
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.close();
    }
}
