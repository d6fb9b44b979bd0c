//! The single versioned championship record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::championship::standings::Standings;
use crate::core::types::EntrantId;
use crate::matches::MatchResult;
use crate::schedule::Pairing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChampionshipPhase {
    #[default]
    Idle,
    Active,
    Finished,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChampionshipState {
    pub phase: ChampionshipPhase,
    /// 1-based; 0 while idle
    pub current_stage: u32,
    /// Entrants in the order they were scheduled
    pub entrants: Vec<EntrantId>,
    /// Results folded into the standings so far, in completion order
    pub matches_played: Vec<MatchResult>,
    /// Pairings of the current stage, in slot order
    pub current_pairings: Vec<Pairing>,
    /// Stages not yet opened, keyed by stage number
    pub remaining_stages: BTreeMap<u32, Vec<Pairing>>,
    pub is_finished: bool,
    pub standings: Standings,
    /// Seed every match roll stream is derived from
    pub seed: u64,
}

impl ChampionshipState {
    pub fn is_active(&self) -> bool {
        self.phase == ChampionshipPhase::Active
    }

    /// Whether a result has already been folded into the standings
    pub fn has_played(&self, result: &MatchResult) -> bool {
        self.matches_played.iter().any(|r| r.id == result.id)
    }

    /// Total stages in the schedule
    pub fn stage_count(&self) -> u32 {
        self.current_stage + self.remaining_stages.len() as u32
    }
}
