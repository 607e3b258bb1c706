//! Game parameters - the per-session rules, fixed at session start
//!
//! Mirrors the TetriNet new-game rules string:
//! `<height> <level> <lines/level> <level inc> <lines/special> <specials added>
//!  <capacity> <piece freqs> <special freqs> <average levels> <classic mode>`
//! where both frequency tables are 100-digit strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rng::{FrequencyError, FrequencyTable};
use crate::types::{PieceKind, SpecialKind, BOARD_HEIGHT, MAX_LEVEL, MAX_SPECIAL_CAPACITY};

/// Classic server piece weights, in `PieceKind::ALL` order
const DEFAULT_PIECE_WEIGHTS: [(PieceKind, u8); 7] = [
    (PieceKind::I, 15),
    (PieceKind::O, 14),
    (PieceKind::J, 14),
    (PieceKind::L, 14),
    (PieceKind::Z, 14),
    (PieceKind::S, 14),
    (PieceKind::T, 15),
];

/// Classic server special weights, in `SpecialKind::ALL` order
const DEFAULT_SPECIAL_WEIGHTS: [(SpecialKind, u8); 9] = [
    (SpecialKind::AddLine, 32),
    (SpecialKind::ClearLine, 18),
    (SpecialKind::NukeField, 1),
    (SpecialKind::RandomClear, 11),
    (SpecialKind::SwitchField, 3),
    (SpecialKind::ClearSpecials, 14),
    (SpecialKind::Gravity, 1),
    (SpecialKind::QuakeField, 6),
    (SpecialKind::BlockBomb, 14),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("rules string is missing `{0}`")]
    Missing(&'static str),
    #[error("`{field}` is not a valid value: {value:?}")]
    BadValue { field: &'static str, value: String },
    #[error("`{field}`: {source}")]
    BadFrequencies {
        field: &'static str,
        #[source]
        source: FrequencyError,
    },
    #[error("`{field}` must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: u64,
    },
    #[error("unexpected trailing rules field {0:?}")]
    Trailing(String),
}

/// Immutable per-session rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameParams {
    /// Garbage rows on the local grid at the start of a game
    pub starting_height: u8,
    pub starting_level: u32,
    pub lines_per_level: u32,
    pub level_increment: u32,
    /// Cleared lines needed for one round of special injection
    pub lines_per_special: u32,
    /// Specials injected per `lines_per_special` threshold crossed
    pub specials_added: u32,
    /// Inventory size; recovered specials beyond it are discarded
    pub special_capacity: usize,
    pub piece_frequencies: FrequencyTable<PieceKind>,
    pub special_frequencies: FrequencyTable<SpecialKind>,
    /// Server-side level averaging; carried for hosts, unused by the simulation
    pub average_levels: bool,
    /// Multi-line clears send classic combo lines to opponents
    pub classic_mode: bool,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            starting_height: 0,
            starting_level: 1,
            lines_per_level: 2,
            level_increment: 1,
            lines_per_special: 1,
            specials_added: 1,
            special_capacity: MAX_SPECIAL_CAPACITY,
            piece_frequencies: FrequencyTable::from_weights(&DEFAULT_PIECE_WEIGHTS)
                .expect("default piece weights sum to 100"),
            special_frequencies: FrequencyTable::from_weights(&DEFAULT_SPECIAL_WEIGHTS)
                .expect("default special weights sum to 100"),
            average_levels: true,
            classic_mode: true,
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ParamsError> {
    value.parse().map_err(|_| ParamsError::BadValue {
        field,
        value: value.to_string(),
    })
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, ParamsError> {
    match value.to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ParamsError::BadValue {
            field,
            value: value.to_string(),
        }),
    }
}

impl GameParams {
    /// Parse and validate a TetriNet new-game rules string
    ///
    /// ```
    /// use tetrinet_core::GameParams;
    ///
    /// let pieces = "1".repeat(50) + &"2".repeat(50);
    /// let specials = "1".repeat(100);
    /// let rules = format!("0 1 2 1 1 1 18 {pieces} {specials} 1 0");
    /// let params = GameParams::from_rules(&rules).unwrap();
    /// assert!(!params.classic_mode);
    /// assert_eq!(params.special_capacity, 18);
    /// ```
    pub fn from_rules(rules: &str) -> Result<Self, ParamsError> {
        let mut fields = rules.split_whitespace();
        let mut next = |name: &'static str| fields.next().ok_or(ParamsError::Missing(name));

        let starting_height = parse_number("starting_height", next("starting_height")?)?;
        let starting_level = parse_number("starting_level", next("starting_level")?)?;
        let lines_per_level = parse_number("lines_per_level", next("lines_per_level")?)?;
        let level_increment = parse_number("level_increment", next("level_increment")?)?;
        let lines_per_special = parse_number("lines_per_special", next("lines_per_special")?)?;
        let specials_added = parse_number("specials_added", next("specials_added")?)?;
        let special_capacity = parse_number("special_capacity", next("special_capacity")?)?;
        let piece_frequencies = FrequencyTable::from_digits(next("piece_frequencies")?)
            .map_err(|source| ParamsError::BadFrequencies {
                field: "piece_frequencies",
                source,
            })?;
        let special_frequencies = FrequencyTable::from_digits(next("special_frequencies")?)
            .map_err(|source| ParamsError::BadFrequencies {
                field: "special_frequencies",
                source,
            })?;
        let average_levels = parse_flag("average_levels", next("average_levels")?)?;
        let classic_mode = parse_flag("classic_mode", next("classic_mode")?)?;

        if let Some(extra) = fields.next() {
            return Err(ParamsError::Trailing(extra.to_string()));
        }

        let params = Self {
            starting_height,
            starting_level,
            lines_per_level,
            level_increment,
            lines_per_special,
            specials_added,
            special_capacity,
            piece_frequencies,
            special_frequencies,
            average_levels,
            classic_mode,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the ranges the session relies on
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.lines_per_level == 0 {
            return Err(ParamsError::OutOfRange {
                field: "lines_per_level",
                expected: "at least 1",
                value: 0,
            });
        }
        if self.lines_per_special == 0 {
            return Err(ParamsError::OutOfRange {
                field: "lines_per_special",
                expected: "at least 1",
                value: 0,
            });
        }
        if self.special_capacity > MAX_SPECIAL_CAPACITY {
            return Err(ParamsError::OutOfRange {
                field: "special_capacity",
                expected: "at most 18",
                value: self.special_capacity as u64,
            });
        }
        if self.starting_height >= BOARD_HEIGHT {
            return Err(ParamsError::OutOfRange {
                field: "starting_height",
                expected: "below the board height",
                value: self.starting_height as u64,
            });
        }
        if self.starting_level > MAX_LEVEL {
            return Err(ParamsError::OutOfRange {
                field: "starting_level",
                expected: "at most 100",
                value: self.starting_level as u64,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules_with(capacity: &str, classic: &str) -> String {
        let pieces = "1234567".repeat(14) + "12";
        let specials = "123456789".repeat(11) + "1";
        format!("3 0 2 1 1 2 {capacity} {pieces} {specials} 0 {classic}")
    }

    #[test]
    fn defaults_are_valid() {
        let params = GameParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.piece_frequencies.weight(PieceKind::I), 15);
        assert_eq!(params.special_frequencies.weight(SpecialKind::AddLine), 32);
    }

    #[test]
    fn parses_rules_string() {
        let params = GameParams::from_rules(&rules_with("12", "1")).unwrap();
        assert_eq!(params.starting_height, 3);
        assert_eq!(params.starting_level, 0);
        assert_eq!(params.specials_added, 2);
        assert_eq!(params.special_capacity, 12);
        assert!(!params.average_levels);
        assert!(params.classic_mode);
        assert_eq!(params.piece_frequencies.pick(2), PieceKind::J);
        assert_eq!(params.special_frequencies.pick(8), SpecialKind::BlockBomb);
    }

    #[test]
    fn rejects_capacity_over_limit() {
        let err = GameParams::from_rules(&rules_with("19", "1")).unwrap_err();
        assert!(matches!(
            err,
            ParamsError::OutOfRange {
                field: "special_capacity",
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_flag_and_missing_fields() {
        let err = GameParams::from_rules(&rules_with("12", "maybe")).unwrap_err();
        assert!(matches!(err, ParamsError::BadValue { field: "classic_mode", .. }));

        let err = GameParams::from_rules("0 1 2").unwrap_err();
        assert_eq!(err, ParamsError::Missing("level_increment"));
    }

    #[test]
    fn rejects_trailing_field() {
        let rules = rules_with("12", "1") + " extra";
        let err = GameParams::from_rules(&rules).unwrap_err();
        assert_eq!(err, ParamsError::Trailing("extra".to_string()));
    }

    #[test]
    fn rejects_zero_thresholds() {
        let params = GameParams {
            lines_per_special: 0,
            ..GameParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn bad_frequency_digits_name_the_field() {
        let pieces = "9".repeat(100);
        let specials = "1".repeat(100);
        let rules = format!("0 1 2 1 1 1 18 {pieces} {specials} 1 1");
        let err = GameParams::from_rules(&rules).unwrap_err();
        assert_eq!(
            err,
            ParamsError::BadFrequencies {
                field: "piece_frequencies",
                source: FrequencyError::BadDigit('9'),
            }
        );
    }
}
