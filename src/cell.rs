//! Cell coordinates and their persisted encodings.
//!
//! A live cell is just its coordinate. Persistence uses the `"x,y"` string
//! key; `[x, y]` pairs are accepted on input as well.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A board coordinate, `0 <= x < width`, `0 <= y < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CellRepr", into = "String")]
pub struct Cell {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Cell {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns true if the cell lies on a `width` x `height` board.
    #[must_use]
    #[inline]
    pub const fn in_bounds(self, width: u32, height: u32) -> bool {
        self.x < width && self.y < height
    }

    /// Wraps a signed coordinate onto a `width` x `height` torus.
    ///
    /// Uses `((c mod dim) + dim) mod dim`, so negative and oversized
    /// components both land inside the board.
    #[must_use]
    pub fn wrapped(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x: wrap(x, width),
            y: wrap(y, height),
        }
    }

    /// The persisted `"x,y"` key.
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }
}

/// Wraps `c` into `[0, dim)`. `dim` must be non-zero.
#[inline]
pub(crate) fn wrap(c: i64, dim: u32) -> u32 {
    let wrapped = c.rem_euclid(i64::from(dim));
    // rem_euclid by a u32 modulus always fits in u32
    u32::try_from(wrapped).unwrap_or(0)
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error for a cell key that is not `"x,y"` with two non-negative integers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell key '{0}'")]
pub struct CellKeyError(pub String);

impl FromStr for Cell {
    type Err = CellKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CellKeyError(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse::<u32>().map_err(|_| err())?;
        let y = y.trim().parse::<u32>().map_err(|_| err())?;
        Ok(Self { x, y })
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.to_string()
    }
}

impl From<(u32, u32)> for Cell {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Accepted wire shapes for a cell.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Key(String),
    Pair([i64; 2]),
}

impl TryFrom<CellRepr> for Cell {
    type Error = CellKeyError;

    fn try_from(repr: CellRepr) -> Result<Self, Self::Error> {
        match repr {
            CellRepr::Key(key) => key.parse(),
            CellRepr::Pair([x, y]) => match (u32::try_from(x), u32::try_from(y)) {
                (Ok(x), Ok(y)) => Ok(Self { x, y }),
                _ => Err(CellKeyError(format!("[{x},{y}]"))),
            },
        }
    }
}
