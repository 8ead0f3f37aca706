//! The global player directory.
//!
//! Players exist independently of any tournament in a single JSON file
//! (an array of flat player records). Tournaments copy players into
//! their own roster at registration; the directory is the place where
//! cross-tournament facts live, `tournaments_won` first among them.
//!
//! The winner bump sits outside the tournament's transactional boundary:
//! finalization never depends on it, and a failed bump is reported to
//! the caller without unwinding anything.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{error::RepoError, identifiers::NationalId, players::Player};

#[derive(Debug)]
/// A JSON-file-backed store of every known player
pub struct PlayerDirectory {
    file_path: PathBuf,
    players: Vec<Player>,
}

impl PlayerDirectory {
    /// Opens the directory backed by the given file, creating an empty
    /// one when absent
    pub fn open(file_path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let file_path = file_path.as_ref().to_path_buf();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !file_path.exists() {
            fs::write(&file_path, "[]")?;
        }
        let players = load_raw(&file_path);
        debug!(
            path = %file_path.display(),
            count = players.len(),
            "opened player directory"
        );
        Ok(PlayerDirectory { file_path, players })
    }

    /// Returns every known player, in insertion order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns a copy of the player with the given id
    pub fn get_by_id(&self, id: &NationalId) -> Option<Player> {
        self.players.iter().find(|p| &p.national_id == id).cloned()
    }

    /// Inserts or replaces a player by id and rewrites the file
    pub fn upsert_player(&mut self, player: Player) -> Result<(), RepoError> {
        match self
            .players
            .iter_mut()
            .find(|p| p.national_id == player.national_id)
        {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
        self.persist()
    }

    /// Credits a tournament win to the given player. Returns `false`
    /// without touching the file when the id is unknown; the caller
    /// decides whether that matters.
    pub fn record_tournament_win(&mut self, id: &NationalId) -> Result<bool, RepoError> {
        match self.players.iter_mut().find(|p| &p.national_id == id) {
            Some(player) => {
                player.record_tournament_win();
                self.persist()?;
                Ok(true)
            }
            None => {
                warn!(%id, "tournament win for a player the directory doesn't know");
                Ok(false)
            }
        }
    }

    fn persist(&self) -> Result<(), RepoError> {
        let data = serde_json::to_string_pretty(&self.players)?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }
}

/// Reads the directory file, treating a missing or malformed file as
/// empty
fn load_raw(path: &Path) -> Vec<Player> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "player directory unreadable, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&data) {
        Ok(players) => players,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "player directory malformed, starting empty");
            Vec::new()
        }
    }
}
