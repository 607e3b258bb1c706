//! Host configuration from environment variables.

use anyhow::{Context, Result};

use tetrinet_core::GameParams;
use tetrinet_types::Seat;

/// Host settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Local seat, 1..=6
    pub seat: Seat,
    pub seed: u32,
    /// TetriNet new-game rules string; `None` uses the classic defaults
    pub rules: Option<String>,
    /// Pieces the soak runner drops before quitting
    pub max_pieces: u32,
    /// Log outbound messages
    pub verbose: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            seat: 1,
            seed: 1,
            rules: None,
            max_pieces: 500,
            verbose: false,
        }
    }
}

impl HostConfig {
    /// Create from environment variables
    ///
    /// - `TETRINET_SEAT` (default 1)
    /// - `TETRINET_SEED` (default 1)
    /// - `TETRINET_RULES` (default: classic rules)
    /// - `TETRINET_MAX_PIECES` (default 500)
    /// - `TETRINET_VERBOSE` (`1`/`true` to enable)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`HostConfig::from_env`] with an arbitrary variable source;
    /// missing or unparsable values fall back to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let seat = lookup("TETRINET_SEAT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.seat);
        let seed = lookup("TETRINET_SEED")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.seed);
        let rules = lookup("TETRINET_RULES")
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });
        let max_pieces = lookup("TETRINET_MAX_PIECES")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pieces);
        let verbose = lookup("TETRINET_VERBOSE")
            .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.verbose);

        Self {
            seat,
            seed,
            rules,
            max_pieces,
            verbose,
        }
    }

    /// Game rules for this host
    pub fn game_params(&self) -> Result<GameParams> {
        match &self.rules {
            Some(rules) => GameParams::from_rules(rules)
                .context("TETRINET_RULES is not a valid rules string"),
            None => Ok(GameParams::default()),
        }
    }
}
