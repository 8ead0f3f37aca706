use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::TournamentError,
    identifiers::NationalId,
    results::{code_to_label, ResultLabel},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// A single pairing inside a round. A match usually opposes two players;
/// when `player2` is absent the match is an exempt bye and the lone
/// player is credited a full point at construction.
///
/// Players are held by id only. The tournament roster owns the player
/// structs; lookups resolve ids back to players when needed.
pub struct Match {
    /// The first player's id
    pub player1: NationalId,
    /// The second player's id, absent for a bye
    pub player2: Option<NationalId>,
    /// Points for the first player
    pub score1: f64,
    /// Points for the second player, `0.0` for a bye
    pub score2: f64,
    /// Outcome label for the first player, unset until scored
    pub result1: Option<ResultLabel>,
    /// Outcome label for the second player
    pub result2: Option<ResultLabel>,
}

impl Match {
    /// Creates a new match. With no second player the exempt outcome is
    /// applied immediately.
    pub fn new(player1: NationalId, player2: Option<NationalId>) -> Self {
        let mut digest = Match {
            player1,
            player2,
            score1: 0.0,
            score2: 0.0,
            result1: None,
            result2: None,
        };
        if digest.is_exempt() {
            digest.auto_set_exempt();
        }
        digest
    }

    /// Calculates if this match is an exempt bye
    pub fn is_exempt(&self) -> bool {
        self.player2.is_none()
    }

    /// Credits the bye: one point and the `exempt` label to the first
    /// player, nothing to the (absent) second one.
    fn auto_set_exempt(&mut self) {
        self.result1 = Some(ResultLabel::Exempt);
        self.score1 = ResultLabel::Exempt.points();
        self.result2 = None;
        self.score2 = 0.0;
    }

    /// Records the outcome from the first player's one-letter code:
    /// `V` victory, `D` defeat, `N` draw, `E` exempt. Both labels and
    /// both scores are set symmetrically. On a bye the exempt outcome is
    /// kept whatever the code, provided it is a canonical one.
    pub fn set_result_by_code(&mut self, code: &str) -> Result<(), TournamentError> {
        let label = code_to_label(code)?;
        if label == ResultLabel::Exempt || self.is_exempt() {
            self.auto_set_exempt();
            return Ok(());
        }
        let (r1, r2) = match label {
            ResultLabel::Victoire => (ResultLabel::Victoire, ResultLabel::Defaite),
            ResultLabel::Defaite => (ResultLabel::Defaite, ResultLabel::Victoire),
            _ => (ResultLabel::Nul, ResultLabel::Nul),
        };
        self.result1 = Some(r1);
        self.result2 = Some(r2);
        self.score1 = r1.points();
        self.score2 = r2.points();
        Ok(())
    }

    /// Records the outcome from a numeric score tuple. Only `(1, 0)`,
    /// `(0, 1)`, and `(0.5, 0.5)` are legal.
    pub fn play_match(&mut self, score1: f64, score2: f64) -> Result<(), TournamentError> {
        if self.is_exempt() {
            self.auto_set_exempt();
            return Ok(());
        }
        let (r1, r2) = if (score1, score2) == (1.0, 0.0) {
            (ResultLabel::Victoire, ResultLabel::Defaite)
        } else if (score1, score2) == (0.0, 1.0) {
            (ResultLabel::Defaite, ResultLabel::Victoire)
        } else if (score1, score2) == (0.5, 0.5) {
            (ResultLabel::Nul, ResultLabel::Nul)
        } else {
            return Err(TournamentError::InvalidScore);
        };
        self.result1 = Some(r1);
        self.result2 = Some(r2);
        self.score1 = score1;
        self.score2 = score2;
        Ok(())
    }

    /// Calculates if the match has an outcome: a bye counts as scored,
    /// as does any recorded label or non-default score pair.
    pub fn is_scored(&self) -> bool {
        self.is_exempt() || self.result1.is_some() || self.score1 != 0.0 || self.score2 != 0.0
    }

    /// Returns both outcome labels, first player's first
    pub fn get_result(&self) -> (Option<ResultLabel>, Option<ResultLabel>) {
        (self.result1, self.result2)
    }

    /// Rebuilds a match from its stored record, resolving both ids
    /// against the given roster. An id the roster doesn't know fails
    /// with `UnknownPlayer`.
    pub fn from_record(
        record: MatchRecord,
        roster: &HashSet<NationalId>,
    ) -> Result<Self, TournamentError> {
        if !roster.contains(&record.player1) {
            return Err(TournamentError::UnknownPlayer(record.player1.to_string()));
        }
        if let Some(p2) = &record.player2 {
            if !roster.contains(p2) {
                return Err(TournamentError::UnknownPlayer(p2.to_string()));
            }
        }
        Ok(Match {
            player1: record.player1,
            player2: record.player2,
            score1: record.score1,
            score2: record.score2,
            result1: record.result1,
            result2: record.result2,
        })
    }

    /// Serializes the match into its stored record
    pub fn to_record(&self) -> MatchRecord {
        MatchRecord {
            player1: self.player1.clone(),
            player2: self.player2.clone(),
            score1: self.score1,
            score2: self.score2,
            result1: self.result1,
            result2: self.result2,
            extra: Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// The persisted form of a match: ids and outcome only
pub struct MatchRecord {
    /// The first player's id
    pub player1: NationalId,
    /// The second player's id, `null` for a bye
    #[serde(default)]
    pub player2: Option<NationalId>,
    #[serde(default)]
    pub score1: f64,
    #[serde(default)]
    pub score2: f64,
    #[serde(default)]
    pub result1: Option<ResultLabel>,
    #[serde(default)]
    pub result2: Option<ResultLabel>,
    /// Unknown keys, preserved across round-trips
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchRecord {
    /// Calculates if the stored match has an outcome, mirroring
    /// `Match::is_scored` without resolving ids
    pub fn is_scored(&self) -> bool {
        self.player2.is_none()
            || self.result1.is_some()
            || self.score1 != 0.0
            || self.score2 != 0.0
    }
}
