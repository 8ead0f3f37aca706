use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    clock::{today_stamp, DATE_FORMAT},
    error::{PlayerField, TournamentError},
    identifiers::NationalId,
};

/// No birth year before this one is accepted
const MIN_BIRTH_YEAR: i32 = 1915;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// A chess player as stored in the global directory and in tournament
/// rosters. Construction and every setter validate their input; the
/// fields are public so records can be read freely, but mutation should
/// go through the setters to keep normalization intact.
pub struct Player {
    /// The player's last name, title-cased
    pub last_name: String,
    /// The player's first name, title-cased
    pub first_name: String,
    /// Date of birth, `YYYY-MM-DD`
    pub birthdate: String,
    /// Unique national identifier, e.g. `AB12345`
    pub national_id: NationalId,
    /// Enrollment date, `YYYY-MM-DD`; stamped at construction and kept
    /// unchanged across persistence round-trips
    #[serde(default = "today_stamp")]
    pub date_enrolled: String,
    /// Count of tournaments won, ties for first included
    #[serde(default)]
    pub tournaments_won: u32,
    /// Keys this engine doesn't model (the legacy `match_history` among
    /// them) ride along untouched and are never read for scoring
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    /// Creates a new player, validating all four identity fields. Names
    /// are title-cased and the id uppercased; `date_enrolled` is stamped
    /// with today's date.
    pub fn new(
        last_name: &str,
        first_name: &str,
        birthdate: &str,
        national_id: &str,
    ) -> Result<Self, TournamentError> {
        if !is_valid_name(last_name) {
            return Err(TournamentError::InvalidField(PlayerField::LastName));
        }
        if !is_valid_name(first_name) {
            return Err(TournamentError::InvalidField(PlayerField::FirstName));
        }
        if !is_valid_birthdate(birthdate) {
            return Err(TournamentError::InvalidField(PlayerField::Birthdate));
        }
        let id = NationalId::new(national_id)?;
        Ok(Player {
            last_name: title_case(last_name),
            first_name: title_case(first_name),
            birthdate: birthdate.to_string(),
            national_id: id,
            date_enrolled: today_stamp(),
            tournaments_won: 0,
            extra: Map::new(),
        })
    }

    /// Updates the last name after validating it
    pub fn set_last_name(&mut self, last_name: &str) -> Result<(), TournamentError> {
        if !is_valid_name(last_name) {
            return Err(TournamentError::InvalidField(PlayerField::LastName));
        }
        self.last_name = title_case(last_name);
        Ok(())
    }

    /// Updates the first name after validating it
    pub fn set_first_name(&mut self, first_name: &str) -> Result<(), TournamentError> {
        if !is_valid_name(first_name) {
            return Err(TournamentError::InvalidField(PlayerField::FirstName));
        }
        self.first_name = title_case(first_name);
        Ok(())
    }

    /// Updates the birthdate after validating it
    pub fn set_birthdate(&mut self, birthdate: &str) -> Result<(), TournamentError> {
        if !is_valid_birthdate(birthdate) {
            return Err(TournamentError::InvalidField(PlayerField::Birthdate));
        }
        self.birthdate = birthdate.to_string();
        Ok(())
    }

    /// Updates the national id after validating it
    pub fn set_national_id(&mut self, national_id: &str) -> Result<(), TournamentError> {
        self.national_id = NationalId::new(national_id)?;
        Ok(())
    }

    /// Increases the count of tournaments won
    pub fn record_tournament_win(&mut self) {
        self.tournaments_won += 1;
    }

    /// Computes the player's age in whole years, adjusting for whether
    /// this year's birthday has passed. `None` if the stored birthdate
    /// doesn't parse.
    pub fn age(&self) -> Option<u32> {
        let birth = NaiveDate::parse_from_str(&self.birthdate, DATE_FORMAT).ok()?;
        let today = Local::now().date_naive();
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

/// Checks that a name is non-empty and made of letters, apostrophes,
/// hyphens, and spaces only. Letters means ASCII plus the accented
/// Latin-1 range, so `Éloïse` passes and other scripts don't.
pub fn is_valid_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.chars().all(is_name_char)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{C0}'..='\u{D6}').contains(&c)
        || ('\u{D8}'..='\u{F6}').contains(&c)
        || ('\u{F8}'..='\u{FF}').contains(&c)
        || c == '\''
        || c == '-'
        || c == ' '
}

/// Checks that a birthdate is `YYYY-MM-DD`, strictly in the past, with a
/// year between 1915 and the current year.
pub fn is_valid_birthdate(birthdate: &str) -> bool {
    match NaiveDate::parse_from_str(birthdate, DATE_FORMAT) {
        Ok(birth) => {
            let today = Local::now().date_naive();
            birth < today && birth.year() >= MIN_BIRTH_YEAR && birth.year() <= today.year()
        }
        Err(_) => false,
    }
}

/// Title-cases a name: the first letter after every non-letter is
/// uppercased, the rest lowercased. `o'neill-dupont` becomes
/// `O'Neill-Dupont`.
fn title_case(name: &str) -> String {
    let mut digest = String::with_capacity(name.len());
    let mut boundary = true;
    for c in name.trim().chars() {
        if c.is_alphabetic() {
            if boundary {
                digest.extend(c.to_uppercase());
            } else {
                digest.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            digest.push(c);
            boundary = true;
        }
    }
    digest
}
