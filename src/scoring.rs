use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{identifiers::NationalId, matches::Match, rounds::Round};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(transparent)]
/// The per-tournament ledger of accumulated points, keyed by player id.
///
/// The ledger reflects the sum of every match whose points were applied
/// and not rolled back. Applying the same match twice corrupts it, so
/// edit flows must roll back before re-applying; the pairing engine
/// applies bye points exactly once, at round creation.
pub struct ScoreLedger {
    points: BTreeMap<NationalId, f64>,
}

impl ScoreLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger with every given player at zero
    pub fn zeroed<'a>(ids: impl IntoIterator<Item = &'a NationalId>) -> Self {
        ScoreLedger {
            points: ids.into_iter().map(|id| (id.clone(), 0.0)).collect(),
        }
    }

    /// Creates a ledger from stored point totals
    pub fn from_points(points: BTreeMap<NationalId, f64>) -> Self {
        ScoreLedger { points }
    }

    /// Registers a player at zero points if absent
    pub fn init_player(&mut self, id: &NationalId) {
        self.points.entry(id.clone()).or_insert(0.0);
    }

    /// Returns a player's accumulated points, zero when unknown
    pub fn get(&self, id: &NationalId) -> f64 {
        self.points.get(id).copied().unwrap_or(0.0)
    }

    /// Calculates the number of tracked players
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Calculates if the ledger tracks no one
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over `(id, points)` entries in id order
    pub fn iter(&self) -> impl Iterator<Item = (&NationalId, f64)> {
        self.points.iter().map(|(id, pts)| (id, *pts))
    }

    /// Adds a match's points to the ledger: `score1` to the first player
    /// and, when an opponent is present, `score2` to the second
    pub fn apply_match_points(&mut self, m: &Match) {
        *self.points.entry(m.player1.clone()).or_insert(0.0) += m.score1;
        if let Some(p2) = &m.player2 {
            *self.points.entry(p2.clone()).or_insert(0.0) += m.score2;
        }
    }

    /// Subtracts the points a previous `apply_match_points` added
    pub fn rollback_match_points(&mut self, m: &Match) {
        *self.points.entry(m.player1.clone()).or_insert(0.0) -= m.score1;
        if let Some(p2) = &m.player2 {
            *self.points.entry(p2.clone()).or_insert(0.0) -= m.score2;
        }
    }

    /// Applies every match of a round once
    pub fn update_from_round(&mut self, round: &Round) {
        for m in &round.matches {
            self.apply_match_points(m);
        }
    }

    /// Returns the highest score in the ledger, `None` when empty
    pub fn max_score(&self) -> Option<f64> {
        self.points
            .values()
            .copied()
            .reduce(|a, b| if b > a { b } else { a })
    }
}
