//! Dense, row-major board used by the step engine.

use crate::cell::{wrap, Cell};

/// A `width * height` byte-per-cell board, row-major.
///
/// Built from the sparse set at the start of a run and owned by the engine
/// thread for the run's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseBoard {
    width: u32,
    height: u32,
    cells: Vec<u8>,
}

impl DenseBoard {
    /// An all-dead board.
    ///
    /// Zero dimensions are raised to 1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![0; width as usize * height as usize],
        }
    }

    /// Builds a board from live cells; out-of-bounds cells are ignored.
    #[must_use]
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>, width: u32, height: u32) -> Self {
        let mut board = Self::new(width, height);
        for cell in cells {
            if cell.in_bounds(board.width, board.height) {
                let idx = board.index(cell.x, cell.y);
                board.cells[idx] = 1;
            }
        }
        board
    }

    pub(crate) fn from_raw(width: u32, height: u32, cells: Vec<u8>) -> Self {
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        Self { width, height, cells }
    }

    /// Live cells in row-major order.
    #[must_use]
    pub fn to_cells(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        for y in 0..self.height {
            let row = self.row(y);
            for (x, &v) in (0u32..).zip(row) {
                if v != 0 {
                    out.push(Cell::new(x, y));
                }
            }
        }
        out
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

    /// State at `(x, y)`; out of range reads as dead.
    #[must_use]
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.cells[self.index(x, y)] != 0
    }

    /// State at a signed coordinate wrapped onto the torus.
    #[must_use]
    #[inline]
    pub fn get_wrapped(&self, x: i64, y: i64) -> bool {
        self.get(wrap(x, self.width), wrap(y, self.height))
    }

    /// Sets `(x, y)`; out of range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, alive: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.cells[idx] = u8::from(alive);
        }
    }

    /// Number of live cells.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    #[inline]
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
