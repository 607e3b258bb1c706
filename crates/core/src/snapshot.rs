//! Field snapshots - the settled cells of a grid in TetriNet field bytes
//!
//! Each cell is one byte: `b'0'` empty, `b'1'..=b'5'` a colored block, or a
//! special's code letter. Snapshots are what the network seam carries after a
//! freeze/clear cycle and what remote seats are restored from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{ROW_COUNT, ROW_LEN};
use crate::types::{Cell, SpecialKind, NUM_COLORS};

const EMPTY: u8 = b'0';

/// Color given to a special cell restored from a snapshot (snapshots keep no color for them)
pub const RESTORED_SPECIAL_COLOR: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("field string needs {expected} cells, got {got}")]
    WrongLength { expected: usize, got: usize },
    #[error("invalid field byte {0:?} at cell {1}")]
    BadCell(char, usize),
}

/// Settled cells of one grid, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldSnapshot {
    rows: [[u8; ROW_LEN]; ROW_COUNT],
}

fn encode(cell: Option<Cell>) -> u8 {
    match cell {
        None => EMPTY,
        Some(Cell {
            special: Some(s), ..
        }) => s.code() as u8,
        Some(Cell { color, .. }) => EMPTY + color.min(NUM_COLORS),
    }
}

fn decode(byte: u8) -> Option<Option<Cell>> {
    match byte {
        EMPTY => Some(None),
        b'1'..=b'5' => Some(Some(Cell::block(byte - EMPTY))),
        _ => SpecialKind::from_code(byte as char)
            .map(|s| Some(Cell::special(RESTORED_SPECIAL_COLOR, s))),
    }
}

impl FieldSnapshot {
    /// All cells empty
    pub fn empty() -> Self {
        Self {
            rows: [[EMPTY; ROW_LEN]; ROW_COUNT],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        decode(self.rows[y][x]).flatten()
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Option<Cell>) {
        self.rows[y][x] = encode(cell);
    }

    /// Raw field bytes, row-major
    pub fn rows(&self) -> &[[u8; ROW_LEN]; ROW_COUNT] {
        &self.rows
    }

    /// The 264-character text form
    pub fn to_field_string(&self) -> String {
        self.rows
            .iter()
            .flat_map(|row| row.iter().map(|&b| b as char))
            .collect()
    }

    /// Parse the 264-character text form
    ///
    /// ```
    /// use tetrinet_core::FieldSnapshot;
    ///
    /// let mut text = "0".repeat(12 * 22);
    /// text.replace_range(263.., "q");
    /// let snap = FieldSnapshot::from_field_string(&text).unwrap();
    /// assert!(snap.get(11, 21).is_some());
    /// assert!(FieldSnapshot::from_field_string("000").is_err());
    /// ```
    pub fn from_field_string(s: &str) -> Result<Self, SnapshotError> {
        let bytes = s.as_bytes();
        if bytes.len() != ROW_LEN * ROW_COUNT {
            return Err(SnapshotError::WrongLength {
                expected: ROW_LEN * ROW_COUNT,
                got: bytes.len(),
            });
        }

        let mut snap = Self::empty();
        for (i, &b) in bytes.iter().enumerate() {
            if decode(b).is_none() {
                return Err(SnapshotError::BadCell(b as char, i));
            }
            snap.rows[i / ROW_LEN][i % ROW_LEN] = b;
        }
        Ok(snap)
    }
}

impl Default for FieldSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<String> for FieldSnapshot {
    type Error = SnapshotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_field_string(&value)
    }
}

impl From<FieldSnapshot> for String {
    fn from(value: FieldSnapshot) -> Self {
        value.to_field_string()
    }
}
