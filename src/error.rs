use std::{fmt, io};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// The player attribute that failed validation
pub enum PlayerField {
    /// The player's last name
    LastName,
    /// The player's first name
    FirstName,
    /// The player's birthdate
    Birthdate,
    /// The player's national identifier
    NationalId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// All the errors that can occur when applying a tournament operation
pub enum TournamentError {
    /// A player attribute failed validation
    InvalidField(PlayerField),
    /// The given result code isn't in the canonical set
    InvalidCode,
    /// The given score tuple isn't one of the three legal outcomes
    InvalidScore,
    /// The roster already contains a player with this id
    DuplicatePlayer,
    /// Registration closed when the first round was created
    RegistrationClosed,
    /// The given id doesn't resolve to a registered player
    UnknownPlayer(String),
    /// The first round needs at least eight players
    RosterTooSmall,
    /// The tournament already has a first round
    AlreadyStarted,
    /// The tournament doesn't have a first round yet
    NotStarted,
    /// All scheduled rounds have already been created
    NoMoreRounds,
    /// A tiebreak round needs at least two distinct leaders
    NoTie,
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TournamentError::*;
        let s = match self {
            InvalidField(_) => "InvalidField",
            InvalidCode => "InvalidCode",
            InvalidScore => "InvalidScore",
            DuplicatePlayer => "DuplicatePlayer",
            RegistrationClosed => "RegistrationClosed",
            UnknownPlayer(_) => "UnknownPlayer",
            RosterTooSmall => "RosterTooSmall",
            AlreadyStarted => "AlreadyStarted",
            NotStarted => "NotStarted",
            NoMoreRounds => "NoMoreRounds",
            NoTie => "NoTie",
        };
        write!(f, "{}", s)
    }
}

impl std::error::Error for TournamentError {}

#[derive(Debug)]
/// An error raised by the persistence layer. These are surfaced separately
/// from engine errors so callers can treat a failed save as recoverable.
pub enum RepoError {
    /// The backing file couldn't be read or written
    Io(io::Error),
    /// The backing file couldn't be serialized
    Json(serde_json::Error),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::Io(e) => write!(f, "Io({})", e),
            RepoError::Json(e) => write!(f, "Json({})", e),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<io::Error> for RepoError {
    fn from(other: io::Error) -> Self {
        RepoError::Io(other)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(other: serde_json::Error) -> Self {
        RepoError::Json(other)
    }
}
