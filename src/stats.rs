//! Cross-tournament participation and scoring rollups.
//!
//! These are derived views over stored records, computed on demand and
//! never persisted.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{identifiers::NationalId, progress::is_finished, tournament::TournamentRecord};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
/// One player's rollup across every stored tournament
pub struct PlayerStats {
    /// Tournaments the player took part in
    pub participations: u32,
    /// Finished tournaments where the player held (or shared) the top
    /// score
    pub victoires: u32,
    /// Matches the player appeared in, byes included for the player who
    /// received them
    pub matchs: u32,
    /// Points collected across all rounds, rounded to one decimal
    pub points: f64,
}

/// Folds the given tournaments into per-player stats, keyed by id
pub fn aggregate_stats(records: &[TournamentRecord]) -> BTreeMap<NationalId, PlayerStats> {
    let mut digest: BTreeMap<NationalId, PlayerStats> = BTreeMap::new();

    for record in records {
        for id in participant_ids(record) {
            digest.entry(id).or_default().participations += 1;
        }

        if is_finished(record) {
            for id in leaders(record) {
                digest.entry(id).or_default().victoires += 1;
            }
        }

        for m in record.rounds.iter().flat_map(|r| &r.matches) {
            let p1 = digest.entry(m.player1.clone()).or_default();
            p1.matchs += 1;
            p1.points += m.score1;
            if let Some(p2) = &m.player2 {
                let p2 = digest.entry(p2.clone()).or_default();
                p2.matchs += 1;
                p2.points += m.score2;
            }
        }
    }

    for stats in digest.values_mut() {
        stats.points = (stats.points * 10.0).round() / 10.0;
    }
    digest
}

/// Collects who took part in a tournament: the roster when it has one,
/// otherwise the ledger keys, otherwise whoever shows up in a match
fn participant_ids(record: &TournamentRecord) -> BTreeSet<NationalId> {
    let roster: BTreeSet<NationalId> = record
        .players
        .iter()
        .map(|p| p.national_id.clone())
        .collect();
    if !roster.is_empty() {
        return roster;
    }
    let ledger: BTreeSet<NationalId> = record.scores.keys().cloned().collect();
    if !ledger.is_empty() {
        return ledger;
    }
    record
        .rounds
        .iter()
        .flat_map(|r| &r.matches)
        .flat_map(|m| std::iter::once(m.player1.clone()).chain(m.player2.clone()))
        .collect()
}

/// Collects the ids holding the tournament's top ledger score, every
/// co-leader included
fn leaders(record: &TournamentRecord) -> Vec<NationalId> {
    let max = record.scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return Vec::new();
    }
    record
        .scores
        .iter()
        .filter(|(_, pts)| **pts == max)
        .map(|(id, _)| id.clone())
        .collect_vec()
}
