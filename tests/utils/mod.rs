#![allow(dead_code)]

use arbiter_lib::{
    identifiers::NationalId, matches::Match, players::Player, tournament::Tournament,
};

pub fn nid(raw: &str) -> NationalId {
    NationalId::new(raw).unwrap()
}

pub fn spoof_player(i: usize) -> Player {
    Player::new("Durand", "Alice", "1992-03-14", &format!("AA{:05}", i)).unwrap()
}

/// Builds an unlaunched tournament with `n` registered players
pub fn spoof_tournament(n: usize) -> Tournament {
    let mut t = Tournament::new("Paris", "", 4);
    for i in 1..=n {
        t.add_player(spoof_player(i)).unwrap();
    }
    t
}

/// Scores every pending match of a round with the code `decide` picks,
/// applying the points match by match, then closes the round. Byes were
/// scored and credited at pairing time, so they are skipped.
pub fn score_round(
    t: &mut Tournament,
    round_idx: usize,
    mut decide: impl FnMut(&Match) -> &'static str,
) {
    for i in 0..t.rounds[round_idx].matches.len() {
        if t.rounds[round_idx].matches[i].is_exempt() {
            continue;
        }
        let code = decide(&t.rounds[round_idx].matches[i]);
        t.rounds[round_idx].matches[i]
            .set_result_by_code(code)
            .unwrap();
        let m = t.rounds[round_idx].matches[i].clone();
        t.apply_match_points(&m);
    }
    t.rounds[round_idx].end_round();
}
