//! Birth/survival rule model.
//!
//! Rules are written in B/S notation: `B` followed by the neighbor counts
//! that bring a dead cell alive, `/S` followed by the counts that keep a
//! live cell alive. `B3/S23` is Conway's Life.
//!
//! Parsing is all-or-nothing: a malformed string never yields a partially
//! populated [`RuleSet`].

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Highest neighbor count in a Moore neighborhood.
pub const MAX_NEIGHBORS: u8 = 8;

static NOTATION: OnceLock<Option<Regex>> = OnceLock::new();

fn notation() -> Option<&'static Regex> {
    NOTATION
        .get_or_init(|| Regex::new(r"^B([0-9]*)/S([0-9]*)$").ok())
        .as_ref()
}

const fn mask_of(counts: &[u8]) -> u16 {
    let mut mask = 0u16;
    let mut i = 0;
    while i < counts.len() {
        mask |= 1u16 << counts[i];
        i += 1;
    }
    mask
}

/// A set of neighbor counts in `0..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NeighborCounts(u16);

impl NeighborCounts {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from counts known at compile time.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in const context) if a count exceeds 8.
    #[must_use]
    pub const fn from_counts(counts: &[u8]) -> Self {
        let mut i = 0;
        while i < counts.len() {
            assert!(counts[i] <= MAX_NEIGHBORS, "neighbor count out of range");
            i += 1;
        }
        Self(mask_of(counts))
    }

    /// Returns true if `count` is a member.
    #[must_use]
    #[inline]
    pub const fn contains(self, count: u8) -> bool {
        count <= MAX_NEIGHBORS && self.0 & (1u16 << count) != 0
    }

    /// Returns true if no count is a member.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=MAX_NEIGHBORS).filter(move |&n| self.contains(n))
    }

    fn insert(&mut self, count: u8) {
        self.0 |= 1u16 << count;
    }
}

impl fmt::Display for NeighborCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for n in self.iter() {
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

/// A birth/survival rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleSet {
    /// Neighbor counts that bring a dead cell alive.
    pub birth: NeighborCounts,
    /// Neighbor counts that keep a live cell alive.
    pub survival: NeighborCounts,
}

impl RuleSet {
    /// Conway's Life, `B3/S23`.
    pub const CONWAY: Self = Self::new(NeighborCounts::from_counts(&[3]), NeighborCounts::from_counts(&[2, 3]));

    /// Creates a rule set from its two count sets.
    #[must_use]
    pub const fn new(birth: NeighborCounts, survival: NeighborCounts) -> Self {
        Self { birth, survival }
    }

    /// Parses B/S notation.
    ///
    /// Whitespace is ignored and letters are case-insensitive. Digits may
    /// repeat and appear in any order; either group may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidRuleSyntax`] for a wrong shape, a digit
    /// above 8 or trailing characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridlife::RuleSet;
    ///
    /// let seeds = RuleSet::parse("b2/s").unwrap();
    /// assert!(seeds.birth.contains(2));
    /// assert!(seeds.survival.is_empty());
    /// assert_eq!(seeds.to_string(), "B2/S");
    /// ```
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let normalized: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let Some(caps) = notation().and_then(|re| re.captures(&normalized)) else {
            return Err(RuleError::InvalidRuleSyntax {
                input: text.to_string(),
                reason: "expected B<digits>/S<digits>".to_string(),
            });
        };

        let birth = parse_counts(text, &caps[1])?;
        let survival = parse_counts(text, &caps[2])?;
        Ok(Self { birth, survival })
    }

    /// Returns the canonical notation: sorted, deduplicated digits.
    #[must_use]
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Next state of one cell given its current state and live neighbor count.
    #[must_use]
    #[inline]
    pub const fn next_state(&self, alive: bool, neighbors: u8) -> bool {
        if alive {
            self.survival.contains(neighbors)
        } else {
            self.birth.contains(neighbors)
        }
    }
}

fn parse_counts(input: &str, digits: &str) -> Result<NeighborCounts, RuleError> {
    let mut counts = NeighborCounts::EMPTY;
    for ch in digits.chars() {
        let n = ch.to_digit(10).and_then(|d| u8::try_from(d).ok()).unwrap_or(u8::MAX);
        if n > MAX_NEIGHBORS {
            return Err(RuleError::InvalidRuleSyntax {
                input: input.to_string(),
                reason: format!("neighbor count {ch} is outside 0-8"),
            });
        }
        counts.insert(n);
    }
    Ok(counts)
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::CONWAY
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}/S{}", self.birth, self.survival)
    }
}

impl FromStr for RuleSet {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RuleSet {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RuleSet> for String {
    fn from(rules: RuleSet) -> Self {
        rules.to_string()
    }
}

/// A named, built-in rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulePreset {
    /// Display name.
    pub name: &'static str,
    /// Notation as shown to users.
    pub notation: &'static str,
    /// Short description.
    pub description: &'static str,
    /// The parsed rules.
    pub rules: RuleSet,
}

const fn preset(
    name: &'static str,
    notation: &'static str,
    description: &'static str,
    birth: &[u8],
    survival: &[u8],
) -> RulePreset {
    RulePreset {
        name,
        notation,
        description,
        rules: RuleSet::new(NeighborCounts::from_counts(birth), NeighborCounts::from_counts(survival)),
    }
}

/// Built-in rule presets.
pub const PRESETS: &[RulePreset] = &[
    preset("Conway", "B3/S23", "Classic Game of Life", &[3], &[2, 3]),
    preset("HighLife", "B36/S23", "Life with replicators", &[3, 6], &[2, 3]),
    preset("Day & Night", "B3678/S34678", "Symmetric rules", &[3, 6, 7, 8], &[3, 4, 6, 7, 8]),
    preset("Seeds", "B2/S", "Explosive growth", &[2], &[]),
    preset(
        "Life without Death",
        "B3/S012345678",
        "Cells never die",
        &[3],
        &[0, 1, 2, 3, 4, 5, 6, 7, 8],
    ),
    preset("Diamoeba", "B35678/S5678", "Creates diamond shapes", &[3, 5, 6, 7, 8], &[5, 6, 7, 8]),
];

/// Looks up a preset by name, ignoring case.
#[must_use]
pub fn find_preset(name: &str) -> Option<&'static RulePreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}
