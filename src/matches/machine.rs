//! Match state machine
//!
//! `NotStarted -> InProgress -> Complete`. Each call to
//! [`advance_one_attempt`] resolves exactly one attempt and persists it
//! through the store; the 72nd attempt finalizes the match.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::error::{ChampionshipError, Result};
use crate::core::types::{AttemptId, MatchId};
use crate::matches::state::{Attempt, MatchResult, NewMatch, OngoingMatch};
use crate::matches::ATTEMPTS_PER_ROUND;
use crate::resolution::{resolve, RollSource, RuleBook};
use crate::schedule::Pairing;
use crate::store::Store;

/// What a single advance did
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    /// An attempt was recorded and the match continues
    Advanced(Attempt),
    /// The match reached its last attempt and was archived
    Finalized(MatchResult),
    /// Nothing to do: the match was already complete
    AlreadyComplete,
}

/// Open a match for a pairing
pub fn open<S: Store + ?Sized>(
    store: &S,
    pairing: Pairing,
    stage: u32,
    slot: u32,
    roll_seed: u64,
) -> Result<MatchId> {
    let id = store.create_match(NewMatch {
        pairing,
        stage,
        slot,
        roll_seed,
    })?;
    tracing::debug!(
        "Opened match {} (stage {}, slot {}): {} vs {}",
        id,
        stage,
        slot,
        pairing.side_a,
        pairing.side_b
    );
    Ok(id)
}

/// Deterministic roll stream for the match's next attempt.
///
/// Depends only on the match seed and attempt count, so a retried attempt
/// replays the same roll.
pub fn attempt_rng(ongoing: &OngoingMatch) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(ongoing.roll_seed);
    rng.set_stream(ongoing.attempt_count as u64);
    rng
}

/// Derive a per-match seed from the championship seed
pub fn match_seed(championship_seed: u64, stage: u32, slot: u32) -> u64 {
    let mut rng = ChaCha8Rng::seed_from_u64(championship_seed);
    rng.set_stream(((stage as u64) << 32) | slot as u64);
    rng.next_u64()
}

/// Attempts left before the current round ends
pub fn attempts_to_round_end(attempt_count: u8) -> u8 {
    ATTEMPTS_PER_ROUND - attempt_count % ATTEMPTS_PER_ROUND
}

/// Advance a match by one attempt using the supplied rolls
pub fn advance_one_attempt<S: Store + ?Sized>(
    store: &S,
    rules: &RuleBook,
    match_id: MatchId,
    rolls: &mut impl RollSource,
) -> Result<AdvanceOutcome> {
    match load(store, match_id)? {
        Some(ongoing) => advance_loaded(store, rules, ongoing, rolls),
        None => Ok(AdvanceOutcome::AlreadyComplete),
    }
}

/// Advance a match by one attempt using its own seeded roll stream
pub fn advance_seeded<S: Store + ?Sized>(
    store: &S,
    rules: &RuleBook,
    match_id: MatchId,
) -> Result<AdvanceOutcome> {
    match load(store, match_id)? {
        Some(ongoing) => {
            let mut rng = attempt_rng(&ongoing);
            advance_loaded(store, rules, ongoing, &mut rng)
        }
        None => Ok(AdvanceOutcome::AlreadyComplete),
    }
}

/// Finalize a match whose 72 attempts are all recorded
pub fn finalize<S: Store + ?Sized>(store: &S, match_id: MatchId) -> Result<MatchResult> {
    let ongoing = store.read_match(match_id)?;
    finalize_loaded(store, &ongoing)
}

/// Read an open match; `None` once it has been archived
fn load<S: Store + ?Sized>(store: &S, match_id: MatchId) -> Result<Option<OngoingMatch>> {
    match store.read_match(match_id) {
        Ok(ongoing) => Ok(Some(ongoing)),
        Err(ChampionshipError::MatchNotFound(id)) => match store.match_result(id)? {
            Some(_) => Ok(None),
            None => Err(ChampionshipError::MatchNotFound(id)),
        },
        Err(e) => Err(e),
    }
}

fn advance_loaded<S: Store + ?Sized>(
    store: &S,
    rules: &RuleBook,
    ongoing: OngoingMatch,
    rolls: &mut impl RollSource,
) -> Result<AdvanceOutcome> {
    // A match can be full but unarchived if finalizing failed last time
    if ongoing.is_full() {
        let result = finalize_loaded(store, &ongoing)?;
        return Ok(AdvanceOutcome::Finalized(result));
    }

    let count = ongoing.attempt_count;
    let side = ongoing.attacking_side();
    let attacking_entrant = ongoing.pairing.entrant(side);
    let defending_entrant = ongoing.pairing.entrant(side.opposite());

    let attacking_roster = store.get_roster(attacking_entrant)?;
    let defending_roster = store.get_roster(defending_entrant)?;

    let attacker = attacking_roster
        .cyclic_member(count)
        .ok_or(ChampionshipError::MissingRosterData(attacking_entrant))?;
    let defender = defending_roster
        .cyclic_member(count)
        .ok_or(ChampionshipError::MissingRosterData(defending_entrant))?;

    let outcome = resolve(rules, attacker, defender, rolls).map_err(|e| {
        if let ChampionshipError::UnresolvedOutcomeBucket { sport, end_value } = &e {
            tracing::error!(
                "Match {} attempt {}: no {} bucket for end value {}; attempt aborted",
                ongoing.id,
                count + 1,
                sport,
                end_value
            );
        }
        e
    })?;

    let attempt = Attempt {
        id: AttemptId::new(),
        attempt_number: count + 1,
        round_number: count / ATTEMPTS_PER_ROUND + 1,
        attacking_side: side,
        attacking_entrant,
        defending_entrant,
        attacking_member: attacker.id,
        defending_member: defender.id,
        outcome,
    };

    tracing::debug!(
        "Match {} attempt {}: {}",
        ongoing.id,
        attempt.attempt_number,
        attempt.outcome.description
    );

    let updated = store.append_attempt(ongoing.id, count, attempt.clone())?;

    if updated.is_full() {
        let result = finalize_loaded(store, &updated)?;
        Ok(AdvanceOutcome::Finalized(result))
    } else {
        Ok(AdvanceOutcome::Advanced(attempt))
    }
}

fn finalize_loaded<S: Store + ?Sized>(store: &S, ongoing: &OngoingMatch) -> Result<MatchResult> {
    let result = MatchResult::from_match(ongoing)?;
    store.archive_match(ongoing.id, result.clone())?;

    tracing::info!(
        "Match {} final: {} {} - {} {}{}",
        result.id,
        result.pairing.side_a,
        result.score_a,
        result.score_b,
        result.pairing.side_b,
        if result.decided_by_tiebreak { " (tiebreak)" } else { "" }
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_to_round_end() {
        assert_eq!(attempts_to_round_end(0), 6);
        assert_eq!(attempts_to_round_end(4), 2);
        assert_eq!(attempts_to_round_end(5), 1);
        assert_eq!(attempts_to_round_end(6), 6);
        assert_eq!(attempts_to_round_end(71), 1);
    }

    #[test]
    fn test_match_seed_is_stable_and_distinct() {
        assert_eq!(match_seed(9, 1, 0), match_seed(9, 1, 0));
        assert_ne!(match_seed(9, 1, 0), match_seed(9, 1, 1));
        assert_ne!(match_seed(9, 1, 0), match_seed(9, 2, 0));
        assert_ne!(match_seed(9, 1, 0), match_seed(10, 1, 0));
    }
}
