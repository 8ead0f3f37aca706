mod utils;

use rand::{rngs::StdRng, SeedableRng};

use arbiter_lib::{
    matches::Match,
    tournament::{Tournament, TournamentRecord, STATUS_FINISHED},
};
use utils::{nid, score_round, spoof_tournament};

/// A full four-round tournament where one player wins every game ends
/// with that player as the unique winner on four points.
#[test]
fn dominant_player_wins_eight_player_tournament() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut t = spoof_tournament(8);
    let champ = nid("AA00001");

    t.start_first_round(&mut rng).unwrap();
    for round in 0..4 {
        let champ_for_rule = champ.clone();
        score_round(&mut t, round, |m: &Match| {
            if m.player1 == champ_for_rule {
                "V"
            } else if m.player2.as_ref() == Some(&champ_for_rule) {
                "D"
            } else {
                "V"
            }
        });
        if round < 3 {
            t.start_next_round(&mut rng).unwrap();
        }
    }

    assert_eq!(t.current_round_number, 4);
    assert_eq!(t.rounds.len(), 4);
    assert!(t.rounds.iter().all(|r| r.is_closed()));
    assert!(!t.have_first_place_tie());
    assert_eq!(t.compute_winner_id(), Some(champ.clone()));

    t.mark_finished();
    assert_eq!(t.status(), STATUS_FINISHED);
    assert_eq!(t.winner_id, Some(champ.clone()));
    assert_eq!(t.scores.get(&champ), 4.0);
    assert!(!t.finished_at.is_empty());

    // Score conservation held in every round: one point per match
    for round in &t.rounds {
        let total: f64 = round.matches.iter().map(|m| m.score1 + m.score2).sum();
        assert_eq!(total, round.matches.len() as f64);
    }
}

/// With nine players every round carries exactly one bye, credited a
/// single point at pairing time.
#[test]
fn odd_roster_byes_one_player_per_round() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut t = spoof_tournament(9);
    t.start_first_round(&mut rng).unwrap();

    let byes: Vec<&Match> = t.rounds[0].matches.iter().filter(|m| m.is_exempt()).collect();
    assert_eq!(byes.len(), 1);
    let bye = byes[0];
    assert_eq!(bye.player2, None);
    assert_eq!(bye.score1, 1.0);
    assert_eq!(bye.score2, 0.0);
    let bye_id = bye.player1.clone();
    assert_eq!(t.scores.get(&bye_id), 1.0);

    score_round(&mut t, 0, |_| "N");
    assert!(t.rounds[0].is_closed());
    // The bye point is the only whole point in an all-draw round
    let total: f64 = t.scores.iter().map(|(_, p)| p).sum();
    assert_eq!(total, 5.0);
}

/// The second round repeats no pairing from the first when the first
/// splits the field into winners and losers.
#[test]
fn second_round_avoids_first_round_pairs() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut t = spoof_tournament(8);
    t.start_first_round(&mut rng).unwrap();
    score_round(&mut t, 0, |_| "V");

    let after_round_one = t.past_pairs.clone();
    t.start_next_round(&mut rng).unwrap();
    for m in &t.rounds[1].matches {
        let p2 = m.player2.as_ref().unwrap();
        assert!(
            !after_round_one.have_played(&m.player1, p2),
            "round 2 repeated {} vs {}",
            m.player1,
            p2
        );
    }
}

/// Two players finishing the schedule tied on top trigger a playoff
/// round of exactly one match, after which the tournament finalizes.
#[test]
fn first_place_tie_goes_to_a_playoff() {
    let mut rng = StdRng::seed_from_u64(41);
    let mut t = spoof_tournament(8);
    let (a, b) = (nid("AA00001"), nid("AA00002"));

    // A and B win everything, draw when they meet; the rest of the
    // field draws among itself
    t.start_first_round(&mut rng).unwrap();
    for round in 0..4 {
        let (a2, b2) = (a.clone(), b.clone());
        score_round(&mut t, round, move |m: &Match| {
            let p2 = m.player2.as_ref().unwrap();
            let star1 = m.player1 == a2 || m.player1 == b2;
            let star2 = *p2 == a2 || *p2 == b2;
            match (star1, star2) {
                (true, true) => "N",
                (true, false) => "V",
                (false, true) => "D",
                (false, false) => "N",
            }
        });
        if round < 3 {
            t.start_next_round(&mut rng).unwrap();
        }
    }

    assert!(t.have_first_place_tie());
    let leaders = t.tied_leaders();
    assert_eq!(leaders, vec![a.clone(), b.clone()]);
    assert_eq!(t.scores.get(&a), t.scores.get(&b));

    let pairs_before = t.past_pairs.clone();
    t.start_tiebreak_round(&leaders, &mut rng).unwrap();
    assert_eq!(t.current_round_number, 5);
    assert_eq!(t.rounds.len(), 5);
    assert_eq!(t.rounds[4].matches.len(), 1);
    let playoff = &t.rounds[4].matches[0];
    assert!(playoff.player1 == a || playoff.player1 == b);
    assert!(playoff.player2 == Some(a.clone()) || playoff.player2 == Some(b.clone()));

    // A wins the playoff from whichever side of the board
    let a2 = a.clone();
    score_round(&mut t, 4, move |m: &Match| {
        if m.player1 == a2 {
            "V"
        } else {
            "D"
        }
    });
    assert!(!t.have_first_place_tie());
    t.mark_finished();
    assert_eq!(t.winner_id, Some(a));
    assert!(!t.finished_at.is_empty());
    assert_eq!(t.past_pairs, pairs_before);
}

/// An all-draw schedule leaves the whole field tied; repeated decisive
/// playoff rounds shrink the lead until a single winner remains.
#[test]
fn playoff_loop_terminates_from_a_full_field_tie() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut t = spoof_tournament(8);
    t.start_first_round(&mut rng).unwrap();
    for round in 0..4 {
        score_round(&mut t, round, |_| "N");
        if round < 3 {
            t.start_next_round(&mut rng).unwrap();
        }
    }
    assert_eq!(t.tied_leaders().len(), 8);
    let pairs_before = t.past_pairs.clone();

    while t.have_first_place_tie() {
        let leaders = t.tied_leaders();
        t.start_tiebreak_round(&leaders, &mut rng).unwrap();
        let last = t.rounds.len() - 1;
        score_round(&mut t, last, |_| "V");
    }

    // 8 leaders, then 4, then 2, then one
    assert_eq!(t.current_round_number, 7);
    assert_eq!(t.rounds.len(), 7);
    assert_eq!(t.past_pairs, pairs_before);
    t.mark_finished();
    assert!(t.winner_id.is_some());
}

/// Saving mid-round and rebuilding from the record resumes the
/// tournament exactly: same ledger, same pair history, same pending
/// matches.
#[test]
fn resume_from_a_snapshot_mid_round() {
    let mut rng = StdRng::seed_from_u64(64);
    let mut t = spoof_tournament(8);
    t.start_first_round(&mut rng).unwrap();
    score_round(&mut t, 0, |_| "V");
    t.start_next_round(&mut rng).unwrap();

    // Score a single match of round 2, then snapshot
    t.rounds[1].matches[0].set_result_by_code("N").unwrap();
    let scored = t.rounds[1].matches[0].clone();
    t.apply_match_points(&scored);

    let json = serde_json::to_string_pretty(&t.to_record()).unwrap();
    let record: TournamentRecord = serde_json::from_str(&json).unwrap();
    let resumed = Tournament::from_record(record).unwrap();

    assert_eq!(resumed, t);
    assert_eq!(resumed.current_round_number, 2);
    assert_eq!(resumed.scores, t.scores);
    assert_eq!(resumed.past_pairs, t.past_pairs);
    let pending: Vec<usize> = resumed.rounds[1]
        .matches
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.is_scored())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(pending.len(), 3);
    assert!(!resumed.rounds[1].is_closed());
}
