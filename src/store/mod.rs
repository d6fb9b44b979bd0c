//! Persistence boundary
//!
//! The engine never touches storage directly. Everything it reads or writes
//! goes through [`Store`], which is responsible for making
//! [`Store::append_attempt`] atomic with its score increment and for the
//! optimistic-concurrency checks on matches and the championship record.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::championship::ChampionshipState;
use crate::core::error::Result;
use crate::core::types::{EntrantId, MatchId, Points};
use crate::matches::{Attempt, MatchResult, NewMatch, OngoingMatch};
use crate::roster::Roster;

pub use memory::InMemoryStore;

/// Which entrants `list_entrants` returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrantCriteria {
    /// Every registered entrant
    All,
    /// Only entrants who entered the upcoming championship
    #[default]
    Entered,
}

/// A record paired with the version it was read at
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Career counters per entrant, across matches and championships
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrantStats {
    pub matches_played: u32,
    pub match_wins: u32,
    pub total_points: u64,
}

impl EntrantStats {
    pub fn record(&mut self, points: Points, won: bool) {
        self.matches_played += 1;
        self.total_points += points as u64;
        if won {
            self.match_wins += 1;
        }
    }
}

pub trait Store: Send + Sync {
    /// Roster for an entrant; `MissingRosterData` if unknown
    fn get_roster(&self, entrant: EntrantId) -> Result<Roster>;

    /// Entrant pool in registration order
    fn list_entrants(&self, criteria: EntrantCriteria) -> Result<Vec<EntrantId>>;

    fn create_match(&self, new_match: NewMatch) -> Result<MatchId>;

    /// `MatchNotFound` once the match has been archived
    fn read_match(&self, match_id: MatchId) -> Result<OngoingMatch>;

    /// Ids of every match not yet archived, ordered by (stage, slot)
    fn list_open_matches(&self) -> Result<Vec<MatchId>>;

    /// Record the attempt and credit its points to the attacking side as one
    /// atomic step. Fails with `ConcurrentModification` unless the match still
    /// has exactly `expected_attempt_count` attempts.
    fn append_attempt(
        &self,
        match_id: MatchId,
        expected_attempt_count: u8,
        attempt: Attempt,
    ) -> Result<OngoingMatch>;

    /// Remove the ongoing match, store its result and update both entrants'
    /// stats. Archiving the same match twice fails with `AlreadyComplete`.
    fn archive_match(&self, match_id: MatchId, result: MatchResult) -> Result<()>;

    fn match_result(&self, match_id: MatchId) -> Result<Option<MatchResult>>;

    /// Every archived result, ordered by (stage, slot)
    fn list_match_results(&self) -> Result<Vec<MatchResult>>;

    fn read_championship_state(&self) -> Result<Versioned<ChampionshipState>>;

    /// Write the championship record if it is still at `expected_version`;
    /// returns the new version
    fn write_championship_state(
        &self,
        state: ChampionshipState,
        expected_version: u64,
    ) -> Result<u64>;

    fn entrant_stats(&self, entrant: EntrantId) -> Result<EntrantStats>;

    /// Drop open matches, archived results and entrant stats
    fn clear_championship(&self) -> Result<()>;
}
