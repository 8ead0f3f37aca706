use std::{fmt::Display, ops::Deref, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PlayerField, TournamentError};

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// A national chess identifier, two letters followed by five digits.
/// Stored uppercase; this is the primary key for players everywhere in the
/// engine, so matches, ledgers, and pair histories all hold these instead
/// of player structs.
pub struct NationalId(String);

impl NationalId {
    /// Validates and normalizes a raw id. The only accepted shape is two
    /// ASCII letters followed by five ASCII digits, e.g. `AB12345`.
    pub fn new(raw: &str) -> Result<Self, TournamentError> {
        let trimmed = raw.trim();
        if is_valid_national_id(trimmed) {
            Ok(NationalId(trimmed.to_uppercase()))
        } else {
            Err(TournamentError::InvalidField(PlayerField::NationalId))
        }
    }

    /// Normalizes a raw string without validating it. Used when rebuilding
    /// ids from stored records, which are trusted, and when normalizing
    /// caller-provided leader lists.
    pub fn normalized(raw: &str) -> Self {
        NationalId(raw.trim().to_uppercase())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Checks the two-letters-five-digits shape without normalizing
pub fn is_valid_national_id(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 7
        && bytes[..2].iter().all(|b| b.is_ascii_alphabetic())
        && bytes[2..].iter().all(|b| b.is_ascii_digit())
}

impl Deref for NationalId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for NationalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NationalId {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NationalId::new(s)
    }
}

impl Display for NationalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NationalId> for String {
    fn from(other: NationalId) -> String {
        other.0
    }
}

impl Serialize for NationalId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NationalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(|raw| NationalId::normalized(&raw))
    }
}
