//! The durable store of tournament snapshots.
//!
//! All tournaments live in one JSON file, an ordered array of records
//! keyed by their `name`. Saves are idempotent upserts: a record whose
//! normalized name is already present replaces that entry in place,
//! anything else is appended, and the whole file is rewritten. A missing
//! or malformed file reads as an empty store and is repaired on the next
//! save. Single-writer only; nothing here locks.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{clock::today_stamp, error::RepoError, tournament::TournamentRecord};

/// File name of the backing store inside the repository directory
const STORE_FILE: &str = "tournaments.json";

#[derive(Debug)]
/// A JSON-file-backed, name-keyed upsert store for tournament records
pub struct TournamentRepository {
    file_path: PathBuf,
    tournaments: Vec<TournamentRecord>,
}

impl TournamentRepository {
    /// Opens the repository rooted at the given directory, creating the
    /// directory and an empty store file when absent, then loads the
    /// current records into memory.
    pub fn open(dir_path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let dir_path = dir_path.as_ref();
        fs::create_dir_all(dir_path)?;
        let file_path = dir_path.join(STORE_FILE);
        if !file_path.exists() {
            fs::write(&file_path, "[]")?;
        }
        let tournaments = load_raw(&file_path);
        debug!(
            path = %file_path.display(),
            count = tournaments.len(),
            "opened tournament repository"
        );
        Ok(TournamentRepository {
            file_path,
            tournaments,
        })
    }

    /// Returns every stored record, in insertion order
    pub fn load_all(&self) -> Vec<TournamentRecord> {
        self.tournaments.clone()
    }

    /// Calculates the number of stored records
    pub fn len(&self) -> usize {
        self.tournaments.len()
    }

    /// Calculates if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.tournaments.is_empty()
    }

    /// Upserts a record by its normalized name and rewrites the file. A
    /// record with an empty name is appended; one whose name matches an
    /// existing entry (case-insensitively, after trimming) replaces it
    /// in place, keeping the original position.
    pub fn save_tournament(&mut self, record: TournamentRecord) -> Result<(), RepoError> {
        let key = normalize_name(&record.name);
        if key.is_empty() {
            self.tournaments.push(record);
            return self.persist();
        }
        match self
            .tournaments
            .iter_mut()
            .find(|t| normalize_name(&t.name) == key)
        {
            Some(existing) => *existing = record,
            None => self.tournaments.push(record),
        }
        self.persist()
    }

    /// Alias of [`save_tournament`](Self::save_tournament)
    pub fn add_tournament(&mut self, record: TournamentRecord) -> Result<(), RepoError> {
        self.save_tournament(record)
    }

    /// Returns a copy of the record stored under the given name,
    /// matching case-insensitively
    pub fn get_by_name(&self, name: &str) -> Option<TournamentRecord> {
        let key = normalize_name(name);
        self.tournaments
            .iter()
            .find(|t| normalize_name(&t.name) == key)
            .cloned()
    }

    fn persist(&self) -> Result<(), RepoError> {
        let data = serde_json::to_string_pretty(&self.tournaments)?;
        fs::write(&self.file_path, data)?;
        debug!(
            path = %self.file_path.display(),
            count = self.tournaments.len(),
            "persisted tournament store"
        );
        Ok(())
    }
}

/// Reads the store file, treating a missing or malformed file as empty.
/// The next save rewrites it.
fn load_raw(path: &Path) -> Vec<TournamentRecord> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "tournament store unreadable, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&data) {
        Ok(records) => records,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "tournament store malformed, starting empty");
            Vec::new()
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Slugs a location for use in a tournament name: lowercase, NFKD
/// decomposition with combining marks removed, every run of
/// non-alphanumeric characters collapsed to one `_`, and no leading or
/// trailing `_`.
pub fn slugify_location(location: &str) -> String {
    let folded: String = location
        .trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let mut digest = String::with_capacity(folded.len());
    let mut gap = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !digest.is_empty() {
                digest.push('_');
            }
            digest.push(c);
            gap = false;
        } else {
            gap = true;
        }
    }
    digest
}

/// Generates the next repository name for a tournament at the given
/// location: `tournament_<N>_<slug>_<YYYY-MM-DD>`, where `<N>` is one
/// more than the highest counter found across the existing records.
pub fn generate_tournament_name(location: &str, existing: &[TournamentRecord]) -> String {
    let next_id = existing
        .iter()
        .filter_map(|t| parse_name_counter(&t.name))
        .max()
        .unwrap_or(0)
        + 1;
    format!(
        "tournament_{}_{}_{}",
        next_id,
        slugify_location(location),
        today_stamp()
    )
}

/// Parses `N` out of a `tournament_<N>_...` name
fn parse_name_counter(name: &str) -> Option<u64> {
    let rest = name.strip_prefix("tournament_")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() || !rest[digits.len()..].starts_with('_') {
        return None;
    }
    digits.parse().ok()
}
