//! Generation transition over a dense toroidal board.
//!
//! `step` is a pure function of (board, rules). It reads only the previous
//! generation and writes a fresh board, so the result does not depend on the
//! order cells are visited in.

use crate::grid::DenseBoard;
use crate::rules::RuleSet;

/// Result of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// The next generation.
    pub board: DenseBoard,
    /// Dead cells that became alive.
    pub births: u64,
    /// Live cells that died.
    pub deaths: u64,
}

/// Live Moore neighbors of `(x, y)`, wrapping at the edges. The cell itself
/// is not counted.
#[must_use]
pub fn neighbor_count(board: &DenseBoard, x: u32, y: u32) -> u8 {
    let (x, y) = (i64::from(x), i64::from(y));
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if (dx, dy) != (0, 0) && board.get_wrapped(x + dx, y + dy) {
                count += 1;
            }
        }
    }
    count
}

/// Next state of a single cell, from the current board only.
#[must_use]
pub fn next_cell_state(board: &DenseBoard, x: u32, y: u32, rules: &RuleSet) -> bool {
    rules.next_state(board.get(x, y), neighbor_count(board, x, y))
}

/// Advances `board` by one generation under `rules`.
///
/// O(width * height) time and one fresh board of auxiliary space.
#[must_use]
pub fn step(board: &DenseBoard, rules: &RuleSet) -> StepOutcome {
    let width = board.width() as usize;
    let height = board.height();
    let mut next = Vec::with_capacity(width * height as usize);
    let mut births = 0u64;
    let mut deaths = 0u64;

    for y in 0..height {
        let above = board.row(if y == 0 { height - 1 } else { y - 1 });
        let here = board.row(y);
        let below = board.row(if y + 1 == height { 0 } else { y + 1 });

        for x in 0..width {
            let left = if x == 0 { width - 1 } else { x - 1 };
            let right = if x + 1 == width { 0 } else { x + 1 };

            let neighbors = above[left] + above[x] + above[right]
                + here[left] + here[right]
                + below[left] + below[x] + below[right];

            let alive = here[x] != 0;
            let lives = rules.next_state(alive, neighbors);
            match (alive, lives) {
                (true, false) => deaths += 1,
                (false, true) => births += 1,
                _ => {}
            }
            next.push(u8::from(lives));
        }
    }

    StepOutcome {
        board: DenseBoard::from_raw(board.width(), height, next),
        births,
        deaths,
    }
}
