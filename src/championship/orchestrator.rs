//! Championship orchestrator
//!
//! Drives `Idle -> Active -> Finished`. An external driver calls [`Orchestrator::tick`];
//! each tick advances every open match, folds finished matches into the
//! standings and opens the next stage once the current one is done.

use std::sync::{Mutex, MutexGuard, TryLockError};

use rayon::prelude::*;
use serde::Serialize;

use crate::championship::standings::Standings;
use crate::championship::state::{ChampionshipPhase, ChampionshipState};
use crate::core::config::{EngineConfig, TickMode};
use crate::core::error::{ChampionshipError, Result};
use crate::core::types::{EntrantId, MatchId};
use crate::matches::{self, attempts_to_round_end, match_seed, AdvanceOutcome};
use crate::resolution::RuleBook;
use crate::schedule::{round_robin, Pairing};
use crate::store::{EntrantCriteria, Store};

/// A match whose attempt was aborted this tick; it is retried next tick
#[derive(Debug)]
pub struct MatchFailure {
    pub match_id: MatchId,
    pub error: ChampionshipError,
}

/// What one tick did
#[derive(Debug, Default)]
pub struct TickReport {
    pub phase: ChampionshipPhase,
    pub stage: u32,
    pub attempts_resolved: u32,
    pub matches_completed: Vec<MatchId>,
    pub stage_opened: Option<u32>,
    pub finished: bool,
    pub failures: Vec<MatchFailure>,
}

/// Per-match progress within a tick
struct MatchProgress {
    match_id: MatchId,
    attempts: u32,
    error: Option<ChampionshipError>,
}

/// Summary of a championship start, for the driver to print
#[derive(Debug, Clone, Serialize)]
pub struct StartSummary {
    pub entrants: usize,
    pub stages: u32,
    pub opened: Vec<MatchId>,
    pub seed: u64,
}

pub struct Orchestrator<S: Store> {
    store: S,
    rules: RuleBook,
    config: EngineConfig,
    /// Held for the whole of `start`, `tick` and `reset`
    tick_token: Mutex<()>,
}

impl<S: Store> Orchestrator<S> {
    pub fn new(store: S, rules: RuleBook, config: EngineConfig) -> Self {
        Self {
            store,
            rules,
            config,
            tick_token: Mutex::new(()),
        }
    }

    /// Build an orchestrator from a validated config and the rule book it selects
    pub fn from_config(store: S, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(ChampionshipError::Config)?;
        let rules = config.rule_book()?;
        Ok(Self::new(store, rules, config))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>> {
        match self.tick_token.try_lock() {
            Ok(guard) => Ok(guard),
            // The token guards no data
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => Err(ChampionshipError::ConcurrentModification(
                "another championship operation is in progress".into(),
            )),
        }
    }

    /// Start a championship with the given entrants, in pairing order
    pub fn start(&self, entrants: &[EntrantId]) -> Result<StartSummary> {
        let _token = self.acquire()?;

        let current = self.store.read_championship_state()?;
        if current.value.phase != ChampionshipPhase::Idle {
            return Err(ChampionshipError::ChampionshipNotIdle(current.value.phase));
        }

        let stages = round_robin(entrants)?;
        let seed = self.config.seed.unwrap_or_else(rand::random);

        let mut state = ChampionshipState {
            phase: ChampionshipPhase::Active,
            current_stage: 0,
            entrants: entrants.to_vec(),
            matches_played: Vec::new(),
            current_pairings: Vec::new(),
            remaining_stages: stages
                .into_iter()
                .enumerate()
                .map(|(i, stage)| (i as u32 + 1, stage))
                .collect(),
            is_finished: false,
            standings: Standings::new(entrants),
            seed,
        };
        let stage_count = state.remaining_stages.len() as u32;

        let first_stage = state.remaining_stages.pop_first();
        if let Some((stage, pairings)) = &first_stage {
            state.current_stage = *stage;
            state.current_pairings = pairings.clone();
        }

        // Matches are only opened once the record naming their stage is
        // stored; `tick` opens any that are still missing
        self.store.write_championship_state(state, current.version)?;
        let opened = match &first_stage {
            Some((stage, pairings)) => self.open_missing_matches(seed, *stage, pairings)?,
            None => Vec::new(),
        };

        tracing::info!(
            "Championship started: {} entrants, {} stages, seed {}",
            entrants.len(),
            stage_count,
            seed
        );

        Ok(StartSummary {
            entrants: entrants.len(),
            stages: stage_count,
            opened,
            seed,
        })
    }

    /// Start with the entrant pool the store reports
    pub fn start_from_store(&self, criteria: EntrantCriteria) -> Result<StartSummary> {
        let entrants = self.store.list_entrants(criteria)?;
        self.start(&entrants)
    }

    /// Advance using the configured tick mode
    pub fn tick(&self) -> Result<TickReport> {
        self.tick_with_mode(self.config.tick_mode)
    }

    pub fn tick_with_mode(&self, mode: TickMode) -> Result<TickReport> {
        let _token = self.acquire()?;

        let current = self.store.read_championship_state()?;
        let mut state = current.value;
        let mut report = TickReport {
            phase: state.phase,
            stage: state.current_stage,
            ..TickReport::default()
        };
        if !state.is_active() {
            return Ok(report);
        }

        let open =
            self.open_missing_matches(state.seed, state.current_stage, &state.current_pairings)?;
        let progress: Vec<MatchProgress> = if open.len() >= self.config.parallel_threshold {
            open.par_iter()
                .map(|&match_id| self.advance_match(match_id, mode))
                .collect()
        } else {
            open.iter()
                .map(|&match_id| self.advance_match(match_id, mode))
                .collect()
        };

        for p in progress {
            report.attempts_resolved += p.attempts;
            if let Some(error) = p.error {
                if !error.is_attempt_scoped() {
                    return Err(error);
                }
                tracing::warn!("Match {} attempt aborted: {}", p.match_id, error);
                report.failures.push(MatchFailure {
                    match_id: p.match_id,
                    error,
                });
            }
        }

        // Fold every archived result the state has not seen yet. This also
        // picks up matches finalized by a tick whose state write failed.
        for result in self.store.list_match_results()? {
            if !state.has_played(&result) {
                state.standings.apply(&result);
                report.matches_completed.push(result.id);
                state.matches_played.push(result);
            }
        }

        if self.store.list_open_matches()?.is_empty() {
            match state.remaining_stages.pop_first() {
                Some((stage, pairings)) => {
                    state.current_stage = stage;
                    state.current_pairings = pairings;
                    report.stage_opened = Some(stage);
                }
                None => {
                    state.phase = ChampionshipPhase::Finished;
                    state.is_finished = true;
                    report.finished = true;
                    if let Some(leader) = state.standings.leader() {
                        tracing::info!(
                            "Championship finished after {} matches; leader {} with {} points",
                            state.matches_played.len(),
                            leader.entrant,
                            leader.points
                        );
                    }
                }
            }
        }

        report.phase = state.phase;
        report.stage = state.current_stage;
        let seed = state.seed;
        let next_stage = report
            .stage_opened
            .map(|stage| (stage, state.current_pairings.clone(), state.stage_count()));
        self.store.write_championship_state(state, current.version)?;

        if let Some((stage, pairings, stage_count)) = next_stage {
            self.open_missing_matches(seed, stage, &pairings)?;
            tracing::info!("Stage {} of {} opened", stage, stage_count);
        }

        tracing::debug!(
            "Tick: {} attempts, {} matches completed, {} failures",
            report.attempts_resolved,
            report.matches_completed.len(),
            report.failures.len()
        );

        Ok(report)
    }

    /// Discard the championship and return to Idle
    pub fn reset(&self) -> Result<()> {
        let _token = self.acquire()?;

        let current = self.store.read_championship_state()?;
        self.store.clear_championship()?;
        self.store
            .write_championship_state(ChampionshipState::default(), current.version)?;

        tracing::info!("Championship reset");
        Ok(())
    }

    pub fn standings(&self) -> Result<Standings> {
        Ok(self.store.read_championship_state()?.value.standings)
    }

    pub fn state(&self) -> Result<ChampionshipState> {
        Ok(self.store.read_championship_state()?.value)
    }

    /// Open every match of `stage` that has neither an open match nor a
    /// result yet. Returns the stage's open match ids in slot order.
    fn open_missing_matches(
        &self,
        seed: u64,
        stage: u32,
        pairings: &[Pairing],
    ) -> Result<Vec<MatchId>> {
        let mut open: Vec<(u32, MatchId)> = Vec::new();
        for match_id in self.store.list_open_matches()? {
            let ongoing = self.store.read_match(match_id)?;
            if ongoing.stage == stage {
                open.push((ongoing.slot, match_id));
            }
        }
        let finished: Vec<u32> = self
            .store
            .list_match_results()?
            .iter()
            .filter(|r| r.stage == stage)
            .map(|r| r.slot)
            .collect();

        for (slot, &pairing) in pairings.iter().enumerate() {
            let slot = slot as u32;
            if finished.contains(&slot) || open.iter().any(|(s, _)| *s == slot) {
                continue;
            }
            let match_id =
                matches::open(&self.store, pairing, stage, slot, match_seed(seed, stage, slot))?;
            open.push((slot, match_id));
        }

        open.sort_by_key(|(slot, _)| *slot);
        Ok(open.into_iter().map(|(_, match_id)| match_id).collect())
    }

    fn advance_match(&self, match_id: MatchId, mode: TickMode) -> MatchProgress {
        let mut progress = MatchProgress {
            match_id,
            attempts: 0,
            error: None,
        };

        let ongoing = match self.store.read_match(match_id) {
            Ok(ongoing) => ongoing,
            Err(e) => {
                progress.error = Some(e);
                return progress;
            }
        };

        // Full but unarchived: a previous finalize failed part way
        if ongoing.is_full() {
            if let Err(e) = matches::finalize(&self.store, match_id) {
                progress.error = Some(e);
            }
            return progress;
        }

        let steps = match mode {
            TickMode::Attempt => 1,
            TickMode::Round => attempts_to_round_end(ongoing.attempt_count),
        };

        for _ in 0..steps {
            match matches::advance_seeded(&self.store, &self.rules, match_id) {
                Ok(AdvanceOutcome::Advanced(_)) => progress.attempts += 1,
                Ok(AdvanceOutcome::Finalized(_)) => {
                    progress.attempts += 1;
                    break;
                }
                Ok(AdvanceOutcome::AlreadyComplete) => break,
                Err(e) => {
                    progress.error = Some(e);
                    break;
                }
            }
        }

        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{generate_roster, Entrant};
    use crate::store::InMemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn orchestrator(n: usize, mode: TickMode) -> (Orchestrator<InMemoryStore>, Vec<EntrantId>) {
        let store = InMemoryStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let ids = (0..n)
            .map(|i| {
                store
                    .register_entrant(Entrant::new(format!("Team {}", i), generate_roster(&mut rng)))
                    .unwrap()
            })
            .collect();
        let config = EngineConfig {
            tick_mode: mode,
            seed: Some(5),
            ..EngineConfig::default()
        };
        (Orchestrator::new(store, RuleBook::default(), config), ids)
    }

    #[test]
    fn test_start_opens_first_stage() {
        let (orch, ids) = orchestrator(4, TickMode::Attempt);
        let summary = orch.start(&ids).unwrap();
        assert_eq!(summary.stages, 3);
        assert_eq!(summary.opened.len(), 2);
        assert_eq!(summary.seed, 5);

        let state = orch.state().unwrap();
        assert_eq!(state.phase, ChampionshipPhase::Active);
        assert_eq!(state.current_stage, 1);
        assert_eq!(state.remaining_stages.len(), 2);
        assert_eq!(state.standings.len(), 4);
    }

    #[test]
    fn test_tick_idle_is_noop() {
        let (orch, _) = orchestrator(2, TickMode::Attempt);
        let report = orch.tick().unwrap();
        assert_eq!(report.phase, ChampionshipPhase::Idle);
        assert_eq!(report.attempts_resolved, 0);
    }

    #[test]
    fn test_attempt_tick_advances_each_match_once() {
        let (orch, ids) = orchestrator(4, TickMode::Attempt);
        let summary = orch.start(&ids).unwrap();
        let report = orch.tick().unwrap();
        assert_eq!(report.attempts_resolved, 2);
        for id in summary.opened {
            assert_eq!(orch.store().read_match(id).unwrap().attempt_count, 1);
        }
    }

    #[test]
    fn test_round_tick_completes_round() {
        let (orch, ids) = orchestrator(2, TickMode::Round);
        let summary = orch.start(&ids).unwrap();
        orch.tick_with_mode(TickMode::Attempt).unwrap();
        let report = orch.tick().unwrap();
        assert_eq!(report.attempts_resolved, 5);
        let m = orch.store().read_match(summary.opened[0]).unwrap();
        assert_eq!(m.attempt_count, 6);
    }

    #[test]
    fn test_tick_token_rejects_overlap() {
        let (orch, _) = orchestrator(2, TickMode::Attempt);
        let _held = orch.tick_token.lock().unwrap();
        assert!(matches!(
            orch.tick(),
            Err(ChampionshipError::ConcurrentModification(_))
        ));
    }
}
