//! Persisted board snapshots.
//!
//! A snapshot is a JSON document:
//!
//! ```text
//! {
//!   "version": "1.0",
//!   "width": 100, "height": 100,          // each in [10, 1000]
//!   "rules": "B3/S23",
//!   "generation": 42,
//!   "cells": ["3,4", [5, 6], ...],         // "x,y" keys or [x, y] pairs
//!   "savedAt": "2024-01-01T00:00:00Z"
//! }
//! ```
//!
//! Loading validates the raw document field by field before anything is
//! applied, so a rejected snapshot never partially overwrites a board. Only
//! the board fields can reject a load. An unparsable `rules` string falls
//! back to `B3/S23`, and `version`, `generation` and `savedAt` are metadata:
//! malformed values are replaced with their defaults.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use serde_json::Value;
use tracing::warn;

use crate::cell::Cell;
use crate::config::{MAX_DIMENSION, MIN_DIMENSION};
use crate::error::{LifeResult, SnapshotError, SnapshotRejection};
use crate::grid::GridState;
use crate::rules::RuleSet;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// A serializable board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Schema version tag.
    pub version: String,
    /// Board width.
    pub width: u32,
    /// Board height.
    pub height: u32,
    /// Canonical rule notation (`RuleSet` display form) when captured;
    /// loaded documents keep whatever text they carried.
    pub rules: String,
    /// Generation counter.
    pub generation: u64,
    /// Live cells.
    pub cells: Vec<Cell>,
    /// When the snapshot was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Captures `grid` and `rules` at `saved_at`.
    #[must_use]
    pub fn capture(grid: &GridState, rules: &RuleSet, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            width: grid.width(),
            height: grid.height(),
            rules: rules.to_string(),
            generation: grid.generation(),
            cells: grid.sorted_cells(),
            saved_at: Some(saved_at),
        }
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::InvalidSnapshot`] naming the first failed check.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(text).map_err(|e| SnapshotRejection::Malformed {
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Validates and converts an already-parsed document.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::InvalidSnapshot`] naming the first failed check.
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        let Some(obj) = value.as_object() else {
            return Err(SnapshotRejection::NotAnObject.into());
        };

        let width = integer(obj.get("width"));
        let height = integer(obj.get("height"));
        let (Some(width), Some(height)) = (width, height) else {
            return Err(SnapshotRejection::InvalidDimensions.into());
        };
        let (width, height) = check_dimensions(width, height)?;

        let Some(rules) = obj.get("rules").and_then(Value::as_str) else {
            return Err(SnapshotRejection::InvalidRules.into());
        };

        let Some(entries) = obj.get("cells").and_then(Value::as_array) else {
            return Err(SnapshotRejection::InvalidCells.into());
        };
        let cells = entries
            .iter()
            .map(|entry| {
                Cell::deserialize(entry).map_err(|_| SnapshotRejection::InvalidCell {
                    entry: entry.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: version(obj),
            width,
            height,
            rules: rules.to_string(),
            generation: generation(obj),
            cells,
            saved_at: saved_at(obj),
        })
    }

    /// Re-checks the invariants of a snapshot built in code.
    ///
    /// # Errors
    ///
    /// [`SnapshotRejection::DimensionsOutOfRange`] if a dimension is outside `[10, 1000]`.
    pub fn check(&self) -> Result<(), SnapshotError> {
        check_dimensions(i64::from(self.width), i64::from(self.height))?;
        Ok(())
    }

    /// The rules to apply, falling back to Conway when `rules` does not parse.
    #[must_use]
    pub fn parsed_rules(&self) -> RuleSet {
        RuleSet::parse(&self.rules).unwrap_or_else(|err| {
            warn!(rules = %self.rules, %err, "snapshot rules unparsable, using B3/S23");
            RuleSet::CONWAY
        })
    }

    /// Writes pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `writer`.
    pub fn write_to(&self, writer: &mut impl Write) -> LifeResult<()> {
        serde_json::to_writer_pretty(&mut *writer, self).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Reads and validates a snapshot.
    ///
    /// # Errors
    ///
    /// I/O errors, or [`SnapshotError::InvalidSnapshot`].
    pub fn read_from(reader: &mut impl Read) -> LifeResult<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::from_json(&text)?)
    }
}

fn check_dimensions(width: i64, height: i64) -> Result<(u32, u32), SnapshotRejection> {
    let range = i64::from(MIN_DIMENSION)..=i64::from(MAX_DIMENSION);
    let out_of_range = SnapshotRejection::DimensionsOutOfRange { width, height };
    if !(range.contains(&width) && range.contains(&height)) {
        return Err(out_of_range);
    }
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(out_of_range),
    }
}

/// Reads a JSON number with no fractional part; `100` and `100.0` both count.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integer(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() <= 9.0e15)
            .map(|f| f as i64)
    })
}

fn version(obj: &Map<String, Value>) -> String {
    match obj.get("version") {
        None | Some(Value::Null) => SNAPSHOT_VERSION.to_string(),
        Some(Value::String(v)) => v.clone(),
        Some(other) => {
            warn!(version = %other, "snapshot version is not a string, assuming {SNAPSHOT_VERSION}");
            SNAPSHOT_VERSION.to_string()
        }
    }
}

fn generation(obj: &Map<String, Value>) -> u64 {
    match obj.get("generation") {
        None | Some(Value::Null) => 0,
        Some(value) => integer(Some(value))
            .and_then(|g| u64::try_from(g).ok())
            .unwrap_or_else(|| {
                warn!(generation = %value, "snapshot generation unusable, starting from 0");
                0
            }),
    }
}

fn saved_at(obj: &Map<String, Value>) -> Option<DateTime<Utc>> {
    match obj.get("savedAt") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => match text.parse::<DateTime<Utc>>() {
            Ok(at) => Some(at),
            Err(err) => {
                warn!(saved_at = %text, %err, "snapshot timestamp unparsable, dropping it");
                None
            }
        },
        Some(other) => {
            warn!(saved_at = %other, "snapshot timestamp is not a string, dropping it");
            None
        }
    }
}

/// Builds a timestamped file name: `prefix_YYYY-MM-DDTHH-MM-SS.extension`.
#[must_use]
pub fn snapshot_filename(prefix: &str, extension: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.{extension}", at.format("%Y-%m-%dT%H-%M-%S"))
}
