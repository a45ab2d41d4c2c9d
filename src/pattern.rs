//! Built-in pattern templates.
//!
//! A pattern is an immutable set of live-cell offsets relative to an anchor.
//! Stamping one onto a board is plain translation plus toroidal wrap (see
//! [`crate::grid::GridState::place_pattern`]).

/// A static pattern template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Bounding box width, for previews.
    pub width: u32,
    /// Bounding box height, for previews.
    pub height: u32,
    /// Live-cell `(dx, dy)` offsets from the anchor.
    pub cells: &'static [(u32, u32)],
}

impl Pattern {
    /// Number of live cells in the template.
    #[must_use]
    pub const fn population(&self) -> usize {
        self.cells.len()
    }
}

/// Diagonal spaceship, period 4.
pub const GLIDER: Pattern = Pattern {
    id: "glider",
    name: "Glider",
    description: "Classic spaceship that moves diagonally",
    width: 3,
    height: 3,
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

/// Period 2 oscillator.
pub const BLINKER: Pattern = Pattern {
    id: "blinker",
    name: "Blinker",
    description: "Period 2 oscillator",
    width: 3,
    height: 1,
    cells: &[(0, 0), (1, 0), (2, 0)],
};

/// Period 3 oscillator.
pub const PULSAR: Pattern = Pattern {
    id: "pulsar",
    name: "Pulsar",
    description: "Period 3 oscillator",
    width: 13,
    height: 13,
    cells: &[
        (2, 0), (3, 0), (4, 0), (8, 0), (9, 0), (10, 0),
        (0, 2), (5, 2), (7, 2), (12, 2),
        (0, 3), (5, 3), (7, 3), (12, 3),
        (0, 4), (5, 4), (7, 4), (12, 4),
        (2, 5), (3, 5), (4, 5), (8, 5), (9, 5), (10, 5),
        (2, 7), (3, 7), (4, 7), (8, 7), (9, 7), (10, 7),
        (0, 8), (5, 8), (7, 8), (12, 8),
        (0, 9), (5, 9), (7, 9), (12, 9),
        (0, 10), (5, 10), (7, 10), (12, 10),
        (2, 12), (3, 12), (4, 12), (8, 12), (9, 12), (10, 12),
    ],
};

/// Emits a glider every 30 generations.
pub const GOSPER_GUN: Pattern = Pattern {
    id: "gosper-gun",
    name: "Gosper Glider Gun",
    description: "Produces gliders periodically",
    width: 36,
    height: 9,
    cells: &[
        (0, 4), (0, 5), (1, 4), (1, 5),
        (10, 4), (10, 5), (10, 6),
        (11, 3), (11, 7),
        (12, 2), (12, 8),
        (13, 2), (13, 8),
        (14, 5),
        (15, 3), (15, 7),
        (16, 4), (16, 5), (16, 6),
        (17, 5),
        (20, 2), (20, 3), (20, 4),
        (21, 2), (21, 3), (21, 4),
        (22, 1), (22, 5),
        (24, 0), (24, 1), (24, 5), (24, 6),
        (34, 2), (34, 3), (35, 2), (35, 3),
    ],
};

/// Lightweight spaceship, moves horizontally.
pub const LWSS: Pattern = Pattern {
    id: "lwss",
    name: "Lightweight Spaceship",
    description: "Spaceship that moves horizontally",
    width: 5,
    height: 4,
    cells: &[(1, 0), (4, 0), (0, 1), (0, 2), (4, 2), (0, 3), (1, 3), (2, 3), (3, 3)],
};

/// 2x2 still life.
pub const BLOCK: Pattern = Pattern {
    id: "block",
    name: "Block",
    description: "Stable still life pattern",
    width: 2,
    height: 2,
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

/// The built-in library, in display order.
pub const PATTERNS: &[Pattern] = &[GLIDER, BLINKER, PULSAR, GOSPER_GUN, LWSS, BLOCK];

/// Looks up a built-in pattern by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn offsets_fit_bounding_box() {
        for p in PATTERNS {
            for &(dx, dy) in p.cells {
                assert!(dx < p.width && dy < p.height, "{} offset ({dx},{dy})", p.id);
            }
        }
    }

    #[test]
    fn offsets_are_unique() {
        for p in PATTERNS {
            let unique: HashSet<_> = p.cells.iter().collect();
            assert_eq!(unique.len(), p.population(), "{}", p.id);
        }
    }

    #[test]
    fn ids_are_unique_and_findable() {
        let ids: HashSet<_> = PATTERNS.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), PATTERNS.len());
        assert_eq!(find("gosper-gun").unwrap().population(), 36);
        assert_eq!(find("pulsar").unwrap().population(), 48);
        assert!(find("r-pentomino").is_none());
    }
}
