//! The canonical result codes, labels, and point values.
//!
//! Results enter the engine as one-letter codes (`V`, `D`, `N`, `E`) and
//! are persisted as the French labels `victoire`, `défaite`, `nul`, and
//! `exempt`. Both forms are part of the external contract and are written
//! to disk verbatim.

use std::{collections::HashMap, fmt};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// A match outcome from the perspective of a single player
pub enum ResultLabel {
    /// The player won the match
    #[serde(rename = "victoire")]
    Victoire,
    /// The player lost the match
    #[serde(rename = "défaite")]
    Defaite,
    /// The match was drawn
    #[serde(rename = "nul")]
    Nul,
    /// The player had no opponent and receives a full point
    #[serde(rename = "exempt")]
    Exempt,
}

static CODE_TABLE: Lazy<HashMap<&'static str, ResultLabel>> = Lazy::new(|| {
    HashMap::from([
        ("V", ResultLabel::Victoire),
        ("D", ResultLabel::Defaite),
        ("N", ResultLabel::Nul),
        ("E", ResultLabel::Exempt),
    ])
});

impl ResultLabel {
    /// Returns the points this outcome awards
    pub fn points(&self) -> f64 {
        match self {
            ResultLabel::Victoire => 1.0,
            ResultLabel::Defaite => 0.0,
            ResultLabel::Nul => 0.5,
            ResultLabel::Exempt => 1.0,
        }
    }

    /// Returns the persisted label
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultLabel::Victoire => "victoire",
            ResultLabel::Defaite => "défaite",
            ResultLabel::Nul => "nul",
            ResultLabel::Exempt => "exempt",
        }
    }
}

impl fmt::Display for ResultLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Translates a one-letter code into its canonical label. The code is
/// trimmed and uppercased before lookup; anything outside `{V, D, N, E}`
/// is rejected.
pub fn code_to_label(code: &str) -> Result<ResultLabel, TournamentError> {
    CODE_TABLE
        .get(code.trim().to_uppercase().as_str())
        .copied()
        .ok_or(TournamentError::InvalidCode)
}

/// Returns the points awarded by a canonical label
pub fn label_points(label: ResultLabel) -> f64 {
    label.points()
}

/// Calculates if a raw code normalizes to a canonical one
pub fn is_valid_code(code: &str) -> bool {
    code_to_label(code).is_ok()
}
