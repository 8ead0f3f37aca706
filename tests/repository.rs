mod utils;

use rand::{rngs::StdRng, SeedableRng};
use tempfile::tempdir;

use arbiter_lib::{
    directory::PlayerDirectory,
    repository::{generate_tournament_name, TournamentRepository},
    tournament::Tournament,
};
use utils::{nid, spoof_player, spoof_tournament};

fn record_named(name: &str) -> arbiter_lib::tournament::TournamentRecord {
    let mut t = Tournament::new("Paris", "", 4);
    t.repo_name = name.to_string();
    t.to_record()
}

/// Saving a modified record under an existing name replaces it in place
/// and keeps the order of everything else.
#[test]
fn upsert_replaces_by_name_and_preserves_order() {
    let dir = tempdir().unwrap();
    let mut repo = TournamentRepository::open(dir.path()).unwrap();

    repo.save_tournament(record_named("tournament_1_paris_2025-05-01"))
        .unwrap();
    repo.save_tournament(record_named("tournament_2_lyon_2025-05-02"))
        .unwrap();

    let mut modified = record_named("tournament_1_paris_2025-05-01");
    modified.description = "edition revue".into();
    repo.save_tournament(modified).unwrap();

    let all = repo.load_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "tournament_1_paris_2025-05-01");
    assert_eq!(all[0].description, "edition revue");
    assert_eq!(all[1].name, "tournament_2_lyon_2025-05-02");

    // Lookup is case-insensitive
    let found = repo.get_by_name("TOURNAMENT_1_PARIS_2025-05-01").unwrap();
    assert_eq!(found.description, "edition revue");

    // A record without a name is appended as-is
    let mut anonymous = record_named("ignored");
    anonymous.name.clear();
    repo.save_tournament(anonymous.clone()).unwrap();
    repo.save_tournament(anonymous).unwrap();
    assert_eq!(repo.len(), 4);
}

/// Reopening the repository sees exactly what was saved, in order.
#[test]
fn records_survive_reopen() {
    let dir = tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(12);
    let mut t = spoof_tournament(8);
    t.start_first_round(&mut rng).unwrap();
    t.repo_name = "tournament_1_paris_2025-05-01".into();

    {
        let mut repo = TournamentRepository::open(dir.path()).unwrap();
        repo.save_tournament(t.to_record()).unwrap();
    }

    let repo = TournamentRepository::open(dir.path()).unwrap();
    let record = repo.get_by_name("tournament_1_paris_2025-05-01").unwrap();
    let resumed = Tournament::from_record(record).unwrap();
    assert_eq!(resumed, t);
}

/// A malformed store file reads as empty and gets repaired by the next
/// save.
#[test]
fn malformed_store_starts_empty() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("tournaments.json"), "{not json").unwrap();

    let mut repo = TournamentRepository::open(dir.path()).unwrap();
    assert!(repo.is_empty());
    repo.save_tournament(record_named("tournament_1_nice_2025-05-03"))
        .unwrap();

    let repo = TournamentRepository::open(dir.path()).unwrap();
    assert_eq!(repo.len(), 1);
}

/// Generated names keep counting past whatever is already stored.
#[test]
fn generated_names_never_collide() {
    let dir = tempdir().unwrap();
    let mut repo = TournamentRepository::open(dir.path()).unwrap();
    let mut names = Vec::new();
    for _ in 0..5 {
        let name = generate_tournament_name("Aix-en-Provence", &repo.load_all());
        assert!(!names.contains(&name));
        names.push(name.clone());
        repo.save_tournament(record_named(&name)).unwrap();
    }
    assert!(names[4].starts_with("tournament_5_aix_en_provence_"));
}

/// The winner bump goes through the directory file and survives reload;
/// an unknown id is reported without failing.
#[test]
fn directory_records_tournament_wins() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("players.json");

    let mut directory = PlayerDirectory::open(&path).unwrap();
    directory.upsert_player(spoof_player(1)).unwrap();
    directory.upsert_player(spoof_player(2)).unwrap();

    assert!(directory.record_tournament_win(&nid("AA00001")).unwrap());
    assert!(!directory.record_tournament_win(&nid("ZZ99999")).unwrap());

    let reloaded = PlayerDirectory::open(&path).unwrap();
    assert_eq!(
        reloaded.get_by_id(&nid("AA00001")).unwrap().tournaments_won,
        1
    );
    assert_eq!(
        reloaded.get_by_id(&nid("AA00002")).unwrap().tournaments_won,
        0
    );
}
