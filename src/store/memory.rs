//! In-memory store with JSON snapshots
//!
//! All tables sit behind one `RwLock`, so every trait operation is atomic
//! and readers never see an attempt without its score (or the reverse).
//! Attempt resolution happens outside the lock; only the short
//! read-check-write of each operation holds it.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::championship::ChampionshipState;
use crate::core::error::{ChampionshipError, Result};
use crate::core::types::{EntrantId, MatchId};
use crate::matches::{Attempt, MatchResult, NewMatch, OngoingMatch};
use crate::roster::{Entrant, Roster};
use crate::store::{EntrantCriteria, EntrantStats, Store, Versioned};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Tables {
    /// Registration order is the pairing order
    entrants: Vec<Entrant>,
    open_matches: AHashMap<MatchId, OngoingMatch>,
    results: Vec<MatchResult>,
    championship: Versioned<ChampionshipState>,
    stats: AHashMap<EntrantId, EntrantStats>,
}

impl Tables {
    fn entrant(&self, id: EntrantId) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.id == id)
    }

    fn entrant_mut(&mut self, id: EntrantId) -> Option<&mut Entrant> {
        self.entrants.iter_mut().find(|e| e.id == id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| ChampionshipError::Store("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| ChampionshipError::Store("store lock poisoned".into()))
    }

    /// Register an entrant after validating their roster
    pub fn register_entrant(&self, entrant: Entrant) -> Result<EntrantId> {
        entrant.roster.validate()?;
        let mut tables = self.write()?;
        if tables.entrant(entrant.id).is_some() {
            return Err(ChampionshipError::Store(format!(
                "entrant {} already registered",
                entrant.id
            )));
        }
        let id = entrant.id;
        tables.entrants.push(entrant);
        Ok(id)
    }

    /// Mark whether an entrant takes part in the next championship
    pub fn set_entered(&self, entrant: EntrantId, entered: bool) -> Result<()> {
        let mut tables = self.write()?;
        let record = tables
            .entrant_mut(entrant)
            .ok_or(ChampionshipError::MissingRosterData(entrant))?;
        record.entered = entered;
        Ok(())
    }

    pub fn entrants(&self) -> Result<Vec<Entrant>> {
        Ok(self.read()?.entrants.clone())
    }

    pub fn to_json(&self) -> Result<String> {
        let tables = self.read()?;
        Ok(serde_json::to_string_pretty(&*tables)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let tables: Tables = serde_json::from_str(json)?;
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    /// Write the whole store to a JSON snapshot
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a snapshot, or start empty if the file does not exist yet
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Store for InMemoryStore {
    fn get_roster(&self, entrant: EntrantId) -> Result<Roster> {
        self.read()?
            .entrant(entrant)
            .map(|e| e.roster.clone())
            .ok_or(ChampionshipError::MissingRosterData(entrant))
    }

    fn list_entrants(&self, criteria: EntrantCriteria) -> Result<Vec<EntrantId>> {
        let tables = self.read()?;
        Ok(tables
            .entrants
            .iter()
            .filter(|e| match criteria {
                EntrantCriteria::All => true,
                EntrantCriteria::Entered => e.entered,
            })
            .map(|e| e.id)
            .collect())
    }

    fn create_match(&self, new_match: NewMatch) -> Result<MatchId> {
        let id = MatchId::new();
        let mut tables = self.write()?;
        tables
            .open_matches
            .insert(id, OngoingMatch::new(id, new_match));
        Ok(id)
    }

    fn read_match(&self, match_id: MatchId) -> Result<OngoingMatch> {
        self.read()?
            .open_matches
            .get(&match_id)
            .cloned()
            .ok_or(ChampionshipError::MatchNotFound(match_id))
    }

    fn list_open_matches(&self) -> Result<Vec<MatchId>> {
        let tables = self.read()?;
        let mut open: Vec<&OngoingMatch> = tables.open_matches.values().collect();
        open.sort_by_key(|m| (m.stage, m.slot));
        Ok(open.into_iter().map(|m| m.id).collect())
    }

    fn append_attempt(
        &self,
        match_id: MatchId,
        expected_attempt_count: u8,
        attempt: Attempt,
    ) -> Result<OngoingMatch> {
        let mut tables = self.write()?;
        let ongoing = tables
            .open_matches
            .get_mut(&match_id)
            .ok_or(ChampionshipError::MatchNotFound(match_id))?;
        ongoing.apply_attempt(expected_attempt_count, attempt)?;
        Ok(ongoing.clone())
    }

    fn archive_match(&self, match_id: MatchId, result: MatchResult) -> Result<()> {
        let mut tables = self.write()?;
        if tables.results.iter().any(|r| r.id == match_id) {
            return Err(ChampionshipError::AlreadyComplete(match_id));
        }
        if tables.open_matches.remove(&match_id).is_none() {
            return Err(ChampionshipError::MatchNotFound(match_id));
        }

        for entrant in [result.pairing.side_a, result.pairing.side_b] {
            let points = result.points_for(entrant).unwrap_or(0);
            tables
                .stats
                .entry(entrant)
                .or_default()
                .record(points, result.winner == entrant);
        }

        let position = tables
            .results
            .partition_point(|r| (r.stage, r.slot) <= (result.stage, result.slot));
        tables.results.insert(position, result);
        Ok(())
    }

    fn match_result(&self, match_id: MatchId) -> Result<Option<MatchResult>> {
        Ok(self
            .read()?
            .results
            .iter()
            .find(|r| r.id == match_id)
            .cloned())
    }

    fn list_match_results(&self) -> Result<Vec<MatchResult>> {
        Ok(self.read()?.results.clone())
    }

    fn read_championship_state(&self) -> Result<Versioned<ChampionshipState>> {
        Ok(self.read()?.championship.clone())
    }

    fn write_championship_state(
        &self,
        state: ChampionshipState,
        expected_version: u64,
    ) -> Result<u64> {
        let mut tables = self.write()?;
        let current = tables.championship.version;
        if current != expected_version {
            return Err(ChampionshipError::ConcurrentModification(format!(
                "championship state expected version {}, found {}",
                expected_version, current
            )));
        }
        tables.championship = Versioned {
            version: current + 1,
            value: state,
        };
        Ok(current + 1)
    }

    fn entrant_stats(&self, entrant: EntrantId) -> Result<EntrantStats> {
        Ok(self
            .read()?
            .stats
            .get(&entrant)
            .copied()
            .unwrap_or_default())
    }

    fn clear_championship(&self) -> Result<()> {
        let mut tables = self.write()?;
        tables.open_matches.clear();
        tables.results.clear();
        tables.stats.clear();
        Ok(())
    }
}
