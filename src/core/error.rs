use thiserror::Error;

use crate::championship::ChampionshipPhase;
use crate::core::types::{EntrantId, MatchId};
use crate::roster::Sport;

#[derive(Error, Debug)]
pub enum ChampionshipError {
    #[error("Invalid entrant count: {count} (need an even number, at least 2)")]
    InvalidEntrantCount { count: usize },

    #[error("Entrant {0} is listed more than once")]
    DuplicateEntrant(EntrantId),

    #[error("Missing roster data for entrant {0}")]
    MissingRosterData(EntrantId),

    #[error("Match already complete: {0}")]
    AlreadyComplete(MatchId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("No {sport} ranking bucket covers end value {end_value}")]
    UnresolvedOutcomeBucket { sport: Sport, end_value: i32 },

    #[error("Match {match_id} has only {attempt_count} attempts and cannot be finalized")]
    MatchNotFinished { match_id: MatchId, attempt_count: u8 },

    #[error("Championship is {0:?}; reset it before starting another")]
    ChampionshipNotIdle(ChampionshipPhase),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl ChampionshipError {
    /// True for failures that abort a single match's attempt but leave the
    /// rest of the tick running.
    pub fn is_attempt_scoped(&self) -> bool {
        matches!(
            self,
            ChampionshipError::MissingRosterData(_)
                | ChampionshipError::ConcurrentModification(_)
                | ChampionshipError::UnresolvedOutcomeBucket { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ChampionshipError>;
