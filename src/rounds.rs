use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    clock::now_stamp,
    error::TournamentError,
    identifiers::NationalId,
    matches::{Match, MatchRecord},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// One round of a tournament: an ordered list of matches bracketed by a
/// start and an end timestamp. The round clock starts at construction;
/// the end stamp is set when the round is closed out.
pub struct Round {
    /// The 1-based number of the round
    pub round_number: u32,
    /// When the round was created, `YYYY-MM-DDTHH:MM:SS`
    pub start_time: String,
    /// When the round was closed, empty while it is still open
    pub end_time: String,
    /// The matches of this round, in pairing order
    pub matches: Vec<Match>,
}

impl Round {
    /// Creates a new round, stamping the start time
    pub fn new(round_number: u32) -> Self {
        Round {
            round_number,
            start_time: now_stamp(),
            end_time: String::new(),
            matches: Vec::new(),
        }
    }

    /// Returns the display name of the round, e.g. `Round 2`
    pub fn name(&self) -> String {
        format!("Round {}", self.round_number)
    }

    /// Appends a match
    pub fn add_match(&mut self, m: Match) {
        self.matches.push(m);
    }

    /// Stamps the end time, closing the round
    pub fn end_round(&mut self) {
        self.end_time = now_stamp();
    }

    /// Calculates if the round is closed: either the end time was
    /// stamped or every match has an outcome
    pub fn is_closed(&self) -> bool {
        !self.end_time.is_empty() || self.matches.iter().all(Match::is_scored)
    }

    /// Rebuilds a round from its stored record, resolving every match
    /// against the given roster
    pub fn from_record(
        record: RoundRecord,
        roster: &HashSet<NationalId>,
    ) -> Result<Self, TournamentError> {
        let matches = record
            .matches
            .into_iter()
            .map(|m| Match::from_record(m, roster))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Round {
            round_number: record.round_number,
            start_time: record.start_time,
            end_time: record.end_time,
            matches,
        })
    }

    /// Serializes the round into its stored record
    pub fn to_record(&self) -> RoundRecord {
        RoundRecord {
            round_number: self.round_number,
            name: self.name(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            matches: self.matches.iter().map(Match::to_record).collect(),
            extra: Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// The persisted form of a round
pub struct RoundRecord {
    pub round_number: u32,
    /// Display name, derived from the number on save
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
    /// Unknown keys, preserved across round-trips
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoundRecord {
    /// Calculates if the stored round counts as closed: an end stamp, or
    /// every non-bye match scored
    pub fn is_closed(&self) -> bool {
        !self.end_time.is_empty()
            || self
                .matches
                .iter()
                .filter(|m| m.player2.is_some())
                .all(MatchRecord::is_scored)
    }
}
