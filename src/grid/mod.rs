//! Authoritative board state.
//!
//! `GridState` holds the sparse live-cell set, the generation counter and the
//! cumulative statistics. It is owned by the control context; the engine
//! thread only ever sees copies of the cell set.
//!
//! Invariant: every member of the cell set lies inside `width x height`.

pub mod dense;

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::config::clamp_dimension;
use crate::pattern::Pattern;

pub use dense::DenseBoard;

/// Sparse live-cell set.
pub type CellSet = HashSet<Cell>;

/// Result of an edit request.
///
/// Rejected edits leave the board untouched and are not errors: stale UI
/// coordinates and clicks during a run are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EditOutcome {
    /// The edit was applied.
    Applied,
    /// The target coordinate is outside the board.
    OutOfBounds,
    /// A run or manual step is in progress.
    WhileRunning,
}

impl EditOutcome {
    /// Returns true if the board changed (or was asked to change) as requested.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Generation counter and cumulative statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Completed steps since the last clear/randomize/load.
    pub generation: u64,
    /// Cumulative births.
    pub births: u64,
    /// Cumulative deaths.
    pub deaths: u64,
    /// Current live cell count.
    pub population: usize,
}

/// The board: dimensions, live cells, counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    width: u32,
    height: u32,
    cells: CellSet,
    generation: u64,
    births: u64,
    deaths: u64,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new(100, 100)
    }
}

impl GridState {
    /// An empty board; dimensions are clamped to `[10, 1000]`.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: clamp_dimension(width),
            height: clamp_dimension(height),
            cells: CellSet::new(),
            generation: 0,
            births: 0,
            deaths: 0,
        }
    }

    /// Board width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Board height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Live cells.
    #[must_use]
    pub const fn cells(&self) -> &CellSet {
        &self.cells
    }

    /// Live cells sorted row-major, for stable output.
    #[must_use]
    pub fn sorted_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.cells.iter().copied().collect();
        cells.sort_unstable_by_key(|c| (c.y, c.x));
        cells
    }

    /// Returns true if `(x, y)` is alive.
    #[must_use]
    pub fn is_alive(&self, x: u32, y: u32) -> bool {
        self.cells.contains(&Cell::new(x, y))
    }

    /// Current live cell count.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cells.len()
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Counters snapshot.
    #[must_use]
    pub fn stats(&self) -> Statistics {
        Statistics {
            generation: self.generation,
            births: self.births,
            deaths: self.deaths,
            population: self.cells.len(),
        }
    }

    /// Flips `(x, y)`.
    pub fn toggle(&mut self, x: u32, y: u32) -> EditOutcome {
        let cell = Cell::new(x, y);
        if !cell.in_bounds(self.width, self.height) {
            return EditOutcome::OutOfBounds;
        }
        if !self.cells.remove(&cell) {
            self.cells.insert(cell);
        }
        EditOutcome::Applied
    }

    /// Sets `(x, y)` alive or dead.
    pub fn set(&mut self, x: u32, y: u32, alive: bool) -> EditOutcome {
        let cell = Cell::new(x, y);
        if !cell.in_bounds(self.width, self.height) {
            return EditOutcome::OutOfBounds;
        }
        if alive {
            self.cells.insert(cell);
        } else {
            self.cells.remove(&cell);
        }
        EditOutcome::Applied
    }

    /// Empties the board and resets generation and statistics.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.reset_counters(0);
    }

    /// Replaces the board with independent live cells of probability `density`.
    ///
    /// `density` is clamped to `[0, 1]` (NaN counts as 0). Generation and
    /// statistics reset to zero.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        let density = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };
        self.cells.clear();
        for y in 0..self.height {
            for x in 0..self.width {
                if rng.random_bool(density) {
                    self.cells.insert(Cell::new(x, y));
                }
            }
        }
        self.reset_counters(0);
    }

    /// Changes the dimensions (clamped to `[10, 1000]`), dropping cells that
    /// fall outside. Surviving cells keep their coordinates.
    ///
    /// Returns the dimensions actually applied.
    pub fn resize(&mut self, width: u32, height: u32) -> (u32, u32) {
        self.width = clamp_dimension(width);
        self.height = clamp_dimension(height);
        let (w, h) = (self.width, self.height);
        self.cells.retain(|c| c.in_bounds(w, h));
        (w, h)
    }

    /// Replaces the whole state with loaded data.
    ///
    /// Out-of-bounds cells are dropped; births/deaths reset to zero.
    pub fn load(&mut self, cells: impl IntoIterator<Item = Cell>, width: u32, height: u32, generation: u64) {
        self.width = clamp_dimension(width);
        self.height = clamp_dimension(height);
        let (w, h) = (self.width, self.height);
        self.cells = cells.into_iter().filter(|c| c.in_bounds(w, h)).collect();
        self.reset_counters(generation);
    }

    /// Stamps `offsets` at the anchor, wrapping around the edges.
    ///
    /// Existing live cells are kept (union). Returns how many cells were
    /// newly brought alive.
    pub fn place_cells(
        &mut self,
        anchor_x: i64,
        anchor_y: i64,
        offsets: impl IntoIterator<Item = (u32, u32)>,
    ) -> usize {
        let before = self.cells.len();
        for (dx, dy) in offsets {
            let cell = Cell::wrapped(
                anchor_x + i64::from(dx),
                anchor_y + i64::from(dy),
                self.width,
                self.height,
            );
            self.cells.insert(cell);
        }
        self.cells.len() - before
    }

    /// Stamps a pattern template at the anchor. See [`GridState::place_cells`].
    pub fn place_pattern(&mut self, anchor_x: i64, anchor_y: i64, pattern: &Pattern) -> usize {
        self.place_cells(anchor_x, anchor_y, pattern.cells.iter().copied())
    }

    /// Dense copy for the step engine.
    #[must_use]
    pub fn to_dense(&self) -> DenseBoard {
        DenseBoard::from_cells(self.cells.iter().copied(), self.width, self.height)
    }

    /// Publishes one completed generation.
    ///
    /// Only the scheduler calls this; it is the sole writer of step results.
    pub(crate) fn publish_generation(&mut self, cells: Vec<Cell>, births: u64, deaths: u64) {
        let (w, h) = (self.width, self.height);
        self.cells = cells.into_iter().filter(|c| c.in_bounds(w, h)).collect();
        self.generation += 1;
        self.births += births;
        self.deaths += deaths;
    }

    fn reset_counters(&mut self, generation: u64) {
        self.generation = generation;
        self.births = 0;
        self.deaths = 0;
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::pattern;

    #[test]
    fn toggle_and_set() {
        let mut grid = GridState::new(20, 20);
        assert!(grid.toggle(3, 4).is_applied());
        assert!(grid.is_alive(3, 4));
        assert!(grid.toggle(3, 4).is_applied());
        assert!(!grid.is_alive(3, 4));
        assert!(grid.set(5, 5, true).is_applied());
        assert!(grid.set(5, 5, true).is_applied());
        assert_eq!(grid.population(), 1);
        assert!(grid.set(5, 5, false).is_applied());
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn out_of_bounds_edits_are_ignored() {
        let mut grid = GridState::new(20, 20);
        assert_eq!(grid.toggle(20, 0), EditOutcome::OutOfBounds);
        assert_eq!(grid.set(0, 99, true), EditOutcome::OutOfBounds);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn dimensions_are_clamped() {
        let grid = GridState::new(3, 5000);
        assert_eq!((grid.width(), grid.height()), (10, 1000));
        let mut grid = GridState::new(50, 50);
        assert_eq!(grid.resize(1, 2000), (10, 1000));
    }

    #[test]
    fn resize_truncates_without_recentering() {
        let mut grid = GridState::new(100, 100);
        let _ = grid.set(95, 95, true);
        let _ = grid.set(10, 10, true);
        grid.resize(50, 50);
        assert!(!grid.is_alive(95, 95));
        assert!(grid.is_alive(10, 10));

        let mut grid = GridState::new(100, 100);
        let _ = grid.set(95, 95, true);
        grid.resize(100, 100);
        grid.resize(96, 96);
        assert!(grid.is_alive(95, 95));
    }

    #[test]
    fn randomize_resets_counters_and_respects_density() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = GridState::new(100, 100);
        grid.publish_generation(vec![Cell::new(1, 1)], 4, 2);
        assert_eq!(grid.generation(), 1);

        grid.randomize(0.3, &mut rng);
        let stats = grid.stats();
        assert_eq!((stats.generation, stats.births, stats.deaths), (0, 0, 0));
        // 10_000 trials at p = 0.3; allow a wide band.
        assert!((2_500..3_500).contains(&stats.population), "{}", stats.population);

        grid.randomize(2.0, &mut rng);
        assert_eq!(grid.population(), 10_000);
        grid.randomize(-1.0, &mut rng);
        assert_eq!(grid.population(), 0);
        grid.randomize(f64::NAN, &mut rng);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut grid = GridState::new(10, 10);
        grid.publish_generation(vec![Cell::new(1, 1), Cell::new(2, 2)], 2, 0);
        grid.clear();
        assert_eq!(grid.stats(), Statistics::default());
    }

    #[test]
    fn place_pattern_wraps_and_unions() {
        let mut grid = GridState::new(10, 10);
        let _ = grid.set(0, 0, true);
        let added = grid.place_pattern(9, 9, &pattern::BLOCK);
        assert_eq!(added, 3);
        for (x, y) in [(9, 9), (0, 9), (9, 0), (0, 0)] {
            assert!(grid.is_alive(x, y), "({x},{y})");
        }
        assert_eq!(grid.population(), 4);
    }

    #[test]
    fn place_pattern_accepts_negative_anchor() {
        let mut grid = GridState::new(10, 10);
        grid.place_pattern(-1, 0, &pattern::BLINKER);
        assert_eq!(grid.sorted_cells(), vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(9, 0)]);
    }

    #[test]
    fn load_drops_out_of_bounds_and_sets_generation() {
        let mut grid = GridState::new(100, 100);
        grid.publish_generation(vec![], 9, 9);
        grid.load([Cell::new(1, 1), Cell::new(20, 1)], 20, 20, 42);
        let stats = grid.stats();
        assert_eq!(stats.generation, 42);
        assert_eq!((stats.births, stats.deaths, stats.population), (0, 0, 1));
    }

    #[test]
    fn publish_accumulates() {
        let mut grid = GridState::new(10, 10);
        grid.publish_generation(vec![Cell::new(1, 1)], 1, 0);
        grid.publish_generation(vec![], 0, 1);
        let stats = grid.stats();
        assert_eq!(stats, Statistics { generation: 2, births: 1, deaths: 1, population: 0 });
    }
}
