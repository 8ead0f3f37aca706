use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    clock::{now_stamp, today_stamp},
    error::TournamentError,
    identifiers::NationalId,
    matches::Match,
    pairings::{first_round_pairings, swiss_pairings, tiebreak_pairings, PastPairs},
    players::Player,
    rounds::{Round, RoundRecord},
    scoring::ScoreLedger,
};

/// Default number of scheduled rounds
pub const DEFAULT_NUMBER_ROUNDS: u32 = 4;

/// Minimum roster size to launch a tournament
pub const MIN_ROSTER_SIZE: usize = 8;

/// Status label of a finished tournament
pub const STATUS_FINISHED: &str = "Terminé";
/// Status label of a running tournament
pub const STATUS_RUNNING: &str = "En cours";
/// Status label of a tournament awaiting launch
pub const STATUS_PENDING: &str = "En attente";

#[derive(Debug, Clone, PartialEq)]
/// A Swiss tournament and its full in-memory state.
///
/// The lifecycle runs: roster building while `current_round_number` is
/// zero, launch (`start_first_round`), scheduled rounds
/// (`start_next_round`) up to `number_rounds`, then tiebreak rounds
/// (`start_tiebreak_round`) while the first place stays shared, then
/// `mark_finished`. Every mutating operation checks its guards before
/// touching any state, so a failed call leaves the tournament unchanged.
///
/// The engine performs no I/O. Callers persist a [`TournamentRecord`]
/// snapshot through the repository after each mutation; rebuilding from
/// the last saved record resumes the tournament exactly where it was.
pub struct Tournament {
    /// Where the tournament is held, free text
    pub location: String,
    /// First day of play, `YYYY-MM-DD`, stamped at launch when unset
    pub start_date: String,
    /// Last day of play, stamped at the finish when unset
    pub end_date: String,
    /// Launch timestamp, empty before the first round exists
    pub started_at: String,
    /// Finish timestamp, empty until the tournament is finalized
    pub finished_at: String,
    /// Organizer notes, free text
    pub description: String,
    /// How many rounds are scheduled
    pub number_rounds: u32,
    /// How many rounds exist, zero while registration is open
    pub current_round_number: u32,
    /// The roster, in registration order, unique by id
    pub players: Vec<Player>,
    /// The rounds, in creation order; always
    /// `current_round_number` entries long
    pub rounds: Vec<Round>,
    /// Accumulated points per player
    pub scores: ScoreLedger,
    /// Every pair that met in a scheduled round
    pub past_pairs: PastPairs,
    /// The name the repository stores this tournament under
    pub repo_name: String,
    /// The unique leader once the tournament is decided
    pub winner_id: Option<NationalId>,
    /// Record keys this engine doesn't model, preserved on round-trip
    pub extra: Map<String, Value>,
}

impl Tournament {
    /// Creates a fresh tournament with an empty roster
    pub fn new(location: &str, description: &str, number_rounds: u32) -> Self {
        Tournament {
            location: location.to_string(),
            start_date: String::new(),
            end_date: String::new(),
            started_at: String::new(),
            finished_at: String::new(),
            description: description.to_string(),
            number_rounds,
            current_round_number: 0,
            players: Vec::new(),
            rounds: Vec::new(),
            scores: ScoreLedger::new(),
            past_pairs: PastPairs::new(),
            repo_name: String::new(),
            winner_id: None,
            extra: Map::new(),
        }
    }

    /// Returns the derived status label: finished, running, or pending
    pub fn status(&self) -> &'static str {
        if !self.finished_at.is_empty() {
            STATUS_FINISHED
        } else if !self.started_at.is_empty() {
            STATUS_RUNNING
        } else {
            STATUS_PENDING
        }
    }

    /// Returns the derived display name, `{location}_{start_date}`
    pub fn name(&self) -> String {
        format!("{}_{}", self.location, self.start_date)
    }

    /// Calculates if players can still register
    pub fn registration_open(&self) -> bool {
        self.current_round_number == 0
    }

    /// Calculates if a player id is on the roster
    pub fn has_player(&self, id: &NationalId) -> bool {
        self.players.iter().any(|p| &p.national_id == id)
    }

    /// Calculates the roster size
    pub fn roster_size(&self) -> usize {
        self.players.len()
    }

    /// Returns the organizer notes
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replaces the organizer notes
    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    /// Registers a player for this tournament and opens their ledger
    /// entry at zero. Registration closes once the first round exists.
    pub fn add_player(&mut self, player: Player) -> Result<(), TournamentError> {
        if !self.registration_open() {
            return Err(TournamentError::RegistrationClosed);
        }
        if self.has_player(&player.national_id) {
            return Err(TournamentError::DuplicatePlayer);
        }
        self.scores.init_player(&player.national_id);
        self.players.push(player);
        Ok(())
    }

    /// Stamps the launch date and timestamp if they are still unset
    fn mark_launched(&mut self) {
        if self.start_date.is_empty() {
            self.start_date = today_stamp();
        }
        if self.started_at.is_empty() {
            self.started_at = now_stamp();
        }
    }

    /// Stamps the end date and timestamp if they are still unset, and
    /// fixes the winner when a unique leader exists
    pub fn mark_finished(&mut self) {
        if self.end_date.is_empty() {
            self.end_date = today_stamp();
        }
        if self.finished_at.is_empty() {
            self.finished_at = now_stamp();
        }
        if self.winner_id.is_none() {
            self.winner_id = self.compute_winner_id();
        }
    }

    /// Launches the tournament: shuffles the roster into the first
    /// round's pairings, remembers each pair, and credits the bye
    /// immediately when the roster is odd. Requires an unlaunched
    /// tournament and at least eight uniquely-identified players.
    pub fn start_first_round(&mut self, rng: &mut impl Rng) -> Result<&Round, TournamentError> {
        if self.current_round_number != 0 {
            return Err(TournamentError::AlreadyStarted);
        }
        if self.roster_size() < MIN_ROSTER_SIZE {
            return Err(TournamentError::RosterTooSmall);
        }
        let mut seen: HashSet<&NationalId> = HashSet::with_capacity(self.players.len());
        for p in &self.players {
            if !seen.insert(&p.national_id) {
                return Err(TournamentError::DuplicatePlayer);
            }
        }

        self.mark_launched();
        self.current_round_number = 1;
        let mut round = Round::new(1);
        let roster: Vec<NationalId> = self.roster_ids();
        let pairings = first_round_pairings(&roster, rng);
        for (a, b) in pairings.paired {
            self.past_pairs.remember(&a, &b);
            round.add_match(Match::new(a, Some(b)));
        }
        if let Some(bye) = pairings.bye {
            let exempt = Match::new(bye, None);
            self.scores.apply_match_points(&exempt);
            round.add_match(exempt);
        }
        let idx = self.rounds.len();
        self.rounds.push(round);
        Ok(&self.rounds[idx])
    }

    /// Creates the next scheduled round with Swiss pairings. The bye, if
    /// any, is credited immediately; every real pair goes into the pair
    /// history. Requires a launched tournament with scheduled rounds
    /// remaining.
    pub fn start_next_round(&mut self, rng: &mut impl Rng) -> Result<&Round, TournamentError> {
        if self.current_round_number == 0 {
            return Err(TournamentError::NotStarted);
        }
        if self.current_round_number >= self.number_rounds {
            return Err(TournamentError::NoMoreRounds);
        }

        self.current_round_number += 1;
        let mut round = Round::new(self.current_round_number);
        let roster = self.roster_ids();
        let pairings = swiss_pairings(&roster, &self.scores, &self.past_pairs, rng);
        if let Some(bye) = pairings.bye {
            let exempt = Match::new(bye, None);
            self.scores.apply_match_points(&exempt);
            round.add_match(exempt);
        }
        for (a, b) in pairings.paired {
            self.past_pairs.remember(&a, &b);
            round.add_match(Match::new(a, Some(b)));
        }
        let idx = self.rounds.len();
        self.rounds.push(round);
        Ok(&self.rounds[idx])
    }

    /// Creates a playoff round between the given leaders. The round
    /// number keeps counting past `number_rounds`; rematches are allowed
    /// and the pair history is left untouched.
    pub fn start_tiebreak_round(
        &mut self,
        leaders: &[NationalId],
        rng: &mut impl Rng,
    ) -> Result<&Round, TournamentError> {
        let roster = self.roster_ids();
        let pairings = tiebreak_pairings(leaders, &roster, rng)?;

        self.current_round_number += 1;
        let mut round = Round::new(self.current_round_number);
        for (a, b) in pairings.paired {
            round.add_match(Match::new(a, Some(b)));
        }
        if let Some(bye) = pairings.bye {
            let exempt = Match::new(bye, None);
            self.scores.apply_match_points(&exempt);
            round.add_match(exempt);
        }
        let idx = self.rounds.len();
        self.rounds.push(round);
        Ok(&self.rounds[idx])
    }

    /// Returns the ids sharing the highest score, in roster order
    pub fn tied_leaders(&self) -> Vec<NationalId> {
        let max = self
            .players
            .iter()
            .map(|p| self.scores.get(&p.national_id))
            .fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return Vec::new();
        }
        self.players
            .iter()
            .map(|p| &p.national_id)
            .filter(|id| self.scores.get(id) == max)
            .cloned()
            .collect()
    }

    /// Calculates if the first place is shared
    pub fn have_first_place_tie(&self) -> bool {
        self.tied_leaders().len() > 1
    }

    /// Returns the unique leader, or `None` while the lead is shared or
    /// the roster is empty
    pub fn compute_winner_id(&self) -> Option<NationalId> {
        let mut leaders = self.tied_leaders();
        if leaders.len() == 1 {
            leaders.pop()
        } else {
            None
        }
    }

    /// Applies every match of one of this tournament's rounds to the
    /// ledger. Each match counts once; a caller re-scoring a match must
    /// roll it back first.
    pub fn update_scores_from_round(&mut self, round_number: u32) {
        let Tournament { rounds, scores, .. } = self;
        if let Some(round) = rounds.iter().find(|r| r.round_number == round_number) {
            scores.update_from_round(round);
        }
    }

    /// Adds a match's points to the ledger
    pub fn apply_match_points(&mut self, m: &Match) {
        self.scores.apply_match_points(m);
    }

    /// Subtracts a previously applied match from the ledger
    pub fn rollback_match_points(&mut self, m: &Match) {
        self.scores.rollback_match_points(m);
    }

    /// Returns the roster ids in registration order
    pub fn roster_ids(&self) -> Vec<NationalId> {
        self.players.iter().map(|p| p.national_id.clone()).collect()
    }

    /// Rebuilds a tournament from its stored record. Round matches are
    /// resolved against the loaded roster; an id the roster doesn't know
    /// fails with `UnknownPlayer`. A record without a ledger gets every
    /// roster member opened at zero.
    pub fn from_record(record: TournamentRecord) -> Result<Self, TournamentError> {
        let players = record.players;
        let roster: HashSet<NationalId> =
            players.iter().map(|p| p.national_id.clone()).collect();
        let rounds = record
            .rounds
            .into_iter()
            .map(|r| Round::from_record(r, &roster))
            .collect::<Result<Vec<_>, _>>()?;

        // Older writers stored only a creation timestamp; its date part
        // stands in for a missing start date
        let start_date = if record.start_date.is_empty() {
            record
                .extra
                .get("created_at")
                .and_then(Value::as_str)
                .map(|ts| ts.chars().take(10).collect())
                .unwrap_or_default()
        } else {
            record.start_date
        };

        let scores = if record.scores.is_empty() {
            ScoreLedger::zeroed(players.iter().map(|p| &p.national_id))
        } else {
            ScoreLedger::from_points(record.scores)
        };

        let mut past_pairs = PastPairs::new();
        for (a, b) in &record.past_pairs {
            past_pairs.remember(a, b);
        }

        let winner_id = if record.winner_id.is_empty() {
            None
        } else {
            Some(NationalId::normalized(&record.winner_id))
        };

        Ok(Tournament {
            location: record.location,
            start_date,
            end_date: record.end_date,
            started_at: record.started_at,
            finished_at: record.finished_at,
            description: record.description,
            number_rounds: record.number_rounds,
            current_round_number: record.current_round_number,
            players,
            rounds,
            scores,
            past_pairs,
            repo_name: record.name,
            winner_id,
            extra: record.extra,
        })
    }

    /// Serializes the tournament into its stored record. The record's
    /// `name` is the repository name when one is set, the derived
    /// display name otherwise; `status` is always the derived label.
    pub fn to_record(&self) -> TournamentRecord {
        let name = if self.repo_name.is_empty() {
            self.name()
        } else {
            self.repo_name.clone()
        };
        TournamentRecord {
            name,
            location: self.location.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            started_at: self.started_at.clone(),
            finished_at: self.finished_at.clone(),
            status: self.status().to_string(),
            description: self.description.clone(),
            number_rounds: self.number_rounds,
            current_round_number: self.current_round_number,
            players: self.players.clone(),
            rounds: self.rounds.iter().map(Round::to_record).collect(),
            scores: self.scores.iter().map(|(id, p)| (id.clone(), p)).collect(),
            past_pairs: self
                .past_pairs
                .iter()
                .map(|pair| (pair.first().clone(), pair.second().clone()))
                .collect(),
            winner_id: self
                .winner_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            extra: self.extra.clone(),
        }
    }
}

fn default_number_rounds() -> u32 {
    DEFAULT_NUMBER_ROUNDS
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// The persisted form of a tournament, one entry of the repository file.
/// The field layout is the external contract; keys this engine doesn't
/// model are captured in `extra` and written back verbatim.
pub struct TournamentRecord {
    /// The repository key, `tournament_<N>_<slug>_<date>`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub started_at: String,
    #[serde(default)]
    pub finished_at: String,
    /// Derived status label, rewritten on every save
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_number_rounds")]
    pub number_rounds: u32,
    #[serde(default)]
    pub current_round_number: u32,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
    #[serde(default)]
    pub scores: BTreeMap<NationalId, f64>,
    #[serde(default)]
    pub past_pairs: Vec<(NationalId, NationalId)>,
    #[serde(default)]
    pub winner_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
