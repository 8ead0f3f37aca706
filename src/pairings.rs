//! The pairing engine.
//!
//! Three protocols produce the matches of a round, all deterministic once
//! the caller injects a seeded random source:
//!
//! * first round: shuffle the roster and pair adjacent players;
//! * Swiss rounds: bucket players by current score, shuffle inside each
//!   bucket, then walk the flattened list avoiding rematches where a
//!   rematch-free partner exists;
//! * tiebreak rounds: shuffle only the current leaders and pair them,
//!   rematches permitted.
//!
//! An odd pool always produces exactly one exempt bye. The caller turns
//! the returned pairings into matches, records pair history for the
//! scheduled protocols, and credits the bye point.

use std::{cmp::Ordering, collections::BTreeSet};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{error::TournamentError, identifiers::NationalId, scoring::ScoreLedger};

#[derive(Serialize, Deserialize, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// An unordered pair of player ids. The two ids are kept sorted so that
/// `(a, b)` and `(b, a)` compare and hash identically.
pub struct PlayerPair(NationalId, NationalId);

impl PlayerPair {
    /// Creates a pair, normalizing the order of its members
    pub fn new(a: NationalId, b: NationalId) -> Self {
        if a <= b {
            PlayerPair(a, b)
        } else {
            PlayerPair(b, a)
        }
    }

    /// Returns the lower-sorting member
    pub fn first(&self) -> &NationalId {
        &self.0
    }

    /// Returns the higher-sorting member
    pub fn second(&self) -> &NationalId {
        &self.1
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
/// The set of pairs that have already met in a tournament. Scheduled
/// rounds consult and extend it; tiebreak rounds never touch it.
pub struct PastPairs {
    pairs: BTreeSet<PlayerPair>,
}

impl PastPairs {
    /// Creates an empty pair history
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that two players have met
    pub fn remember(&mut self, a: &NationalId, b: &NationalId) {
        self.pairs.insert(PlayerPair::new(a.clone(), b.clone()));
    }

    /// Calculates if two players have already met
    pub fn have_played(&self, a: &NationalId, b: &NationalId) -> bool {
        self.pairs.contains(&PlayerPair::new(a.clone(), b.clone()))
    }

    /// Calculates the number of recorded pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Calculates if no pair has been recorded
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over the recorded pairs
    pub fn iter(&self) -> impl Iterator<Item = &PlayerPair> {
        self.pairs.iter()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// The outcome of one pairing pass: the matched pairs in table order and
/// the player left over for an exempt bye, if the pool was odd
pub struct Pairings {
    /// The players paired against each other
    pub paired: Vec<(NationalId, NationalId)>,
    /// The player receiving the bye
    pub bye: Option<NationalId>,
}

/// Pairs the whole roster for the first round: shuffle, then pair
/// adjacent entries. An odd roster leaves the final entry as the bye.
pub fn first_round_pairings(roster: &[NationalId], rng: &mut impl Rng) -> Pairings {
    let mut pool = roster.to_vec();
    pool.shuffle(rng);
    let mut digest = Pairings::default();
    for chunk in pool.chunks_exact(2) {
        digest.paired.push((chunk[0].clone(), chunk[1].clone()));
    }
    if pool.len() % 2 == 1 {
        digest.bye = pool.pop();
    }
    digest
}

/// Pairs a scheduled round after the first. Players are bucketed by
/// current score, buckets ordered best first, order inside a bucket
/// randomized. An odd pool drops its final entry (the lowest-ranked
/// player) into the bye before pairing. The walk then takes, for each
/// unused player, the first unused successor they haven't faced yet,
/// falling back to the first unused successor when no fresh opponent
/// remains.
pub fn swiss_pairings(
    roster: &[NationalId],
    ledger: &ScoreLedger,
    past_pairs: &PastPairs,
    rng: &mut impl Rng,
) -> Pairings {
    let mut sorted_ids = ids_by_score(roster, ledger, rng);
    let mut digest = Pairings::default();
    if sorted_ids.len() % 2 == 1 {
        digest.bye = sorted_ids.pop();
    }

    let mut used: BTreeSet<NationalId> = BTreeSet::new();
    for i in 0..sorted_ids.len() {
        let p1 = &sorted_ids[i];
        if used.contains(p1) {
            continue;
        }
        let fresh = sorted_ids[i + 1..]
            .iter()
            .find(|p2| !used.contains(*p2) && !past_pairs.have_played(p1, p2));
        let partner = match fresh {
            Some(p2) => Some(p2),
            None => sorted_ids[i + 1..].iter().find(|p2| !used.contains(*p2)),
        };
        if let Some(p2) = partner {
            used.insert(p1.clone());
            used.insert(p2.clone());
            digest.paired.push((p1.clone(), p2.clone()));
        }
    }
    digest
}

/// Pairs a playoff round between the current co-leaders. The list is
/// deduplicated (first occurrence wins), checked against the roster,
/// shuffled, and paired adjacently; an odd count gives the final entry a
/// bye. Rematch avoidance does not apply here and the produced pairs
/// must not be added to the pair history.
pub fn tiebreak_pairings(
    leaders: &[NationalId],
    roster: &[NationalId],
    rng: &mut impl Rng,
) -> Result<Pairings, TournamentError> {
    let mut seen: BTreeSet<NationalId> = BTreeSet::new();
    let mut pool: Vec<NationalId> = Vec::with_capacity(leaders.len());
    for id in leaders {
        let norm = NationalId::normalized(id);
        if seen.insert(norm.clone()) {
            pool.push(norm);
        }
    }
    if pool.len() < 2 {
        return Err(TournamentError::NoTie);
    }
    for id in &pool {
        if !roster.contains(id) {
            return Err(TournamentError::UnknownPlayer(id.to_string()));
        }
    }

    pool.shuffle(rng);
    let mut digest = Pairings::default();
    if pool.len() % 2 == 1 {
        digest.bye = pool.pop();
    }
    for chunk in pool.chunks_exact(2) {
        digest.paired.push((chunk[0].clone(), chunk[1].clone()));
    }
    Ok(digest)
}

/// Flattens the roster into pairing order: score buckets descending,
/// shuffled within each bucket
fn ids_by_score(roster: &[NationalId], ledger: &ScoreLedger, rng: &mut impl Rng) -> Vec<NationalId> {
    let mut buckets: Vec<(f64, Vec<NationalId>)> = Vec::new();
    for id in roster {
        let score = ledger.get(id);
        match buckets.iter_mut().find(|(s, _)| *s == score) {
            Some((_, ids)) => ids.push(id.clone()),
            None => buckets.push((score, vec![id.clone()])),
        }
    }
    buckets.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    let mut digest = Vec::with_capacity(roster.len());
    for (_, mut ids) in buckets {
        ids.shuffle(rng);
        digest.extend(ids);
    }
    digest
}
