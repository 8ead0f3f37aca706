//! Derives status and progress from a stored tournament.
//!
//! These are pure read-only views. They work over anything that exposes
//! the snapshot fields, so callers can inspect a raw record straight off
//! the repository as easily as a rebuilt model.

use crate::tournament::{Tournament, TournamentRecord, STATUS_FINISHED};

/// The snapshot fields the inspector reads. Implemented by both the
/// stored record and the in-memory model.
pub trait TournamentSnapshot {
    /// The launch timestamp, empty when unset
    fn started_at(&self) -> &str;
    /// The finish timestamp, empty when unset
    fn finished_at(&self) -> &str;
    /// The stored or derived status label
    fn status_text(&self) -> &str;
    /// How many rounds exist
    fn current_round_number(&self) -> u32;
    /// How many rounds are scheduled
    fn number_rounds(&self) -> u32;
    /// How many rounds count as closed
    fn closed_round_count(&self) -> usize;
}

impl TournamentSnapshot for TournamentRecord {
    fn started_at(&self) -> &str {
        &self.started_at
    }

    fn finished_at(&self) -> &str {
        &self.finished_at
    }

    fn status_text(&self) -> &str {
        &self.status
    }

    fn current_round_number(&self) -> u32 {
        self.current_round_number
    }

    fn number_rounds(&self) -> u32 {
        self.number_rounds
    }

    fn closed_round_count(&self) -> usize {
        self.rounds.iter().filter(|r| r.is_closed()).count()
    }
}

impl TournamentSnapshot for Tournament {
    fn started_at(&self) -> &str {
        &self.started_at
    }

    fn finished_at(&self) -> &str {
        &self.finished_at
    }

    fn status_text(&self) -> &str {
        self.status()
    }

    fn current_round_number(&self) -> u32 {
        self.current_round_number
    }

    fn number_rounds(&self) -> u32 {
        self.number_rounds
    }

    fn closed_round_count(&self) -> usize {
        self.rounds.iter().filter(|r| r.is_closed()).count()
    }
}

/// Calculates if the tournament has been launched
pub fn is_started(snapshot: &impl TournamentSnapshot) -> bool {
    !snapshot.started_at().is_empty() || snapshot.current_round_number() > 0
}

/// Calculates if the tournament is over
pub fn is_finished(snapshot: &impl TournamentSnapshot) -> bool {
    !snapshot.finished_at().is_empty() || snapshot.status_text() == STATUS_FINISHED
}

/// Calculates completion as a percentage: 0 before launch, 100 once
/// finished, otherwise the share of closed rounds among the scheduled
/// ones, capped at 100. With the default four scheduled rounds the
/// result lands on the 0/25/50/75/100 ladder.
pub fn progress_percent(snapshot: &impl TournamentSnapshot) -> u32 {
    if !is_started(snapshot) {
        return 0;
    }
    if is_finished(snapshot) {
        return 100;
    }
    let scheduled = snapshot.number_rounds();
    if scheduled == 0 {
        return 100;
    }
    let pct = (snapshot.closed_round_count() as f64 / scheduled as f64 * 100.0).round() as u32;
    pct.min(100)
}

/// Returns the display label: `Terminé`, `Non démarré`, or
/// `En cours {pct}%`
pub fn status_label(snapshot: &impl TournamentSnapshot) -> String {
    if is_finished(snapshot) {
        STATUS_FINISHED.to_string()
    } else if !is_started(snapshot) {
        "Non démarré".to_string()
    } else {
        format!("En cours {}%", progress_percent(snapshot))
    }
}
