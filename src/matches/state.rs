//! Match records: ongoing matches, attempts and final results

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{ChampionshipError, Result};
use crate::core::types::{AttemptId, EntrantId, MatchId, MemberId, Points, Side};
use crate::matches::{ATTEMPTS_PER_MATCH, ATTEMPTS_PER_ROUND};
use crate::resolution::Outcome;
use crate::schedule::Pairing;

/// Lifecycle of a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    NotStarted,
    InProgress,
    Complete,
}

/// Everything a store needs to create a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub pairing: Pairing,
    pub stage: u32,
    /// Position of the pairing within its stage
    pub slot: u32,
    pub roll_seed: u64,
}

/// One resolved attempt (immutable once written)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: AttemptId,
    /// 1..=72
    pub attempt_number: u8,
    /// 1..=12
    pub round_number: u8,
    pub attacking_side: Side,
    pub attacking_entrant: EntrantId,
    pub defending_entrant: EntrantId,
    pub attacking_member: MemberId,
    pub defending_member: MemberId,
    pub outcome: Outcome,
}

/// A match that has been opened but not yet archived
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OngoingMatch {
    pub id: MatchId,
    pub pairing: Pairing,
    pub stage: u32,
    pub slot: u32,
    pub score_a: Points,
    pub score_b: Points,
    pub attempt_count: u8,
    pub attempts: AHashMap<AttemptId, Attempt>,
    pub is_complete: bool,
    pub roll_seed: u64,
}

impl OngoingMatch {
    pub fn new(id: MatchId, new_match: NewMatch) -> Self {
        Self {
            id,
            pairing: new_match.pairing,
            stage: new_match.stage,
            slot: new_match.slot,
            score_a: 0,
            score_b: 0,
            attempt_count: 0,
            attempts: AHashMap::new(),
            is_complete: false,
            roll_seed: new_match.roll_seed,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        if self.is_complete {
            MatchPhase::Complete
        } else if self.attempt_count == 0 {
            MatchPhase::NotStarted
        } else {
            MatchPhase::InProgress
        }
    }

    /// Round the next attempt belongs to
    pub fn round_number(&self) -> u8 {
        self.attempt_count / ATTEMPTS_PER_ROUND + 1
    }

    /// Side attacking in the next attempt
    pub fn attacking_side(&self) -> Side {
        if (self.attempt_count / ATTEMPTS_PER_ROUND) % 2 == 0 {
            Side::A
        } else {
            Side::B
        }
    }

    /// All 72 attempts have been played
    pub fn is_full(&self) -> bool {
        self.attempt_count >= ATTEMPTS_PER_MATCH
    }

    pub fn score(&self, side: Side) -> Points {
        match side {
            Side::A => self.score_a,
            Side::B => self.score_b,
        }
    }

    /// Attempts ordered by attempt number
    pub fn attempt_log(&self) -> Vec<Attempt> {
        let mut log: Vec<Attempt> = self.attempts.values().cloned().collect();
        log.sort_by_key(|a| a.attempt_number);
        log
    }

    /// Record an attempt and its points in one step.
    ///
    /// Rejected unless the match still has `expected_count` attempts and the
    /// new attempt is the next one in sequence.
    pub fn apply_attempt(&mut self, expected_count: u8, attempt: Attempt) -> Result<()> {
        if self.is_complete || self.is_full() {
            return Err(ChampionshipError::AlreadyComplete(self.id));
        }
        if self.attempt_count != expected_count {
            return Err(ChampionshipError::ConcurrentModification(format!(
                "match {} expected {} attempts, found {}",
                self.id, expected_count, self.attempt_count
            )));
        }
        if attempt.attempt_number != expected_count + 1
            || attempt.attacking_side != self.attacking_side()
            || self.attempts.contains_key(&attempt.id)
        {
            return Err(ChampionshipError::ConcurrentModification(format!(
                "match {} rejected out-of-sequence attempt {}",
                self.id, attempt.attempt_number
            )));
        }

        match attempt.attacking_side {
            Side::A => self.score_a += attempt.outcome.points,
            Side::B => self.score_b += attempt.outcome.points,
        }
        self.attempts.insert(attempt.id, attempt);
        self.attempt_count += 1;
        self.is_complete = self.is_full();
        Ok(())
    }
}

/// Winning side for the final scores, and whether the tiebreak decided it.
///
/// An exact tie goes to side A.
pub fn decide_winner(score_a: Points, score_b: Points) -> (Side, bool) {
    if score_b > score_a {
        (Side::B, false)
    } else {
        (Side::A, score_a == score_b)
    }
}

/// Final, immutable record of a completed match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: MatchId,
    pub pairing: Pairing,
    pub stage: u32,
    pub slot: u32,
    pub score_a: Points,
    pub score_b: Points,
    pub winner: EntrantId,
    pub decided_by_tiebreak: bool,
    /// Full attempt log ordered by attempt number
    pub attempts: Vec<Attempt>,
}

impl MatchResult {
    /// Build the result of a full match. Fails if attempts are still outstanding.
    pub fn from_match(ongoing: &OngoingMatch) -> Result<Self> {
        if !ongoing.is_full() {
            return Err(ChampionshipError::MatchNotFinished {
                match_id: ongoing.id,
                attempt_count: ongoing.attempt_count,
            });
        }

        let (side, decided_by_tiebreak) = decide_winner(ongoing.score_a, ongoing.score_b);

        Ok(Self {
            id: ongoing.id,
            pairing: ongoing.pairing,
            stage: ongoing.stage,
            slot: ongoing.slot,
            score_a: ongoing.score_a,
            score_b: ongoing.score_b,
            winner: ongoing.pairing.entrant(side),
            decided_by_tiebreak,
            attempts: ongoing.attempt_log(),
        })
    }

    /// Points the entrant scored in this match, if they played in it
    pub fn points_for(&self, entrant: EntrantId) -> Option<Points> {
        if entrant == self.pairing.side_a {
            Some(self.score_a)
        } else if entrant == self.pairing.side_b {
            Some(self.score_b)
        } else {
            None
        }
    }

    pub fn loser(&self) -> EntrantId {
        if self.winner == self.pairing.side_a {
            self.pairing.side_b
        } else {
            self.pairing.side_a
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::OutcomeKind;

    fn new_match() -> OngoingMatch {
        let pairing = Pairing::new(EntrantId::new(), EntrantId::new());
        OngoingMatch::new(
            MatchId::new(),
            NewMatch {
                pairing,
                stage: 1,
                slot: 0,
                roll_seed: 1,
            },
        )
    }

    fn attempt_for(m: &OngoingMatch, points: Points) -> Attempt {
        let side = m.attacking_side();
        Attempt {
            id: AttemptId::new(),
            attempt_number: m.attempt_count + 1,
            round_number: m.round_number(),
            attacking_side: side,
            attacking_entrant: m.pairing.entrant(side),
            defending_entrant: m.pairing.entrant(side.opposite()),
            attacking_member: MemberId::new(),
            defending_member: MemberId::new(),
            outcome: Outcome {
                kind: if points > 0 {
                    OutcomeKind::OffensiveSuccess
                } else {
                    OutcomeKind::DefensiveSuccess
                },
                points,
                action: "test".into(),
                description: String::new(),
                roll: 50,
                end_value: 100,
            },
        }
    }

    #[test]
    fn test_phases() {
        let mut m = new_match();
        assert_eq!(m.phase(), MatchPhase::NotStarted);
        let a = attempt_for(&m, 10);
        m.apply_attempt(0, a).unwrap();
        assert_eq!(m.phase(), MatchPhase::InProgress);
        m.is_complete = true;
        assert_eq!(m.phase(), MatchPhase::Complete);
    }

    #[test]
    fn test_round_number_and_side_alternate() {
        let mut m = new_match();
        for count in 0..ATTEMPTS_PER_MATCH {
            assert_eq!(m.round_number(), count / 6 + 1);
            let expected = if (count / 6) % 2 == 0 { Side::A } else { Side::B };
            assert_eq!(m.attacking_side(), expected);
            let a = attempt_for(&m, 0);
            m.apply_attempt(count, a).unwrap();
        }
        assert!(m.is_full());
    }

    #[test]
    fn test_apply_credits_attacking_side() {
        let mut m = new_match();
        for count in 0..7 {
            let a = attempt_for(&m, 10);
            m.apply_attempt(count, a).unwrap();
        }
        // six attempts by A, then one by B
        assert_eq!(m.score_a, 60);
        assert_eq!(m.score_b, 10);
    }

    #[test]
    fn test_stale_count_rejected() {
        let mut m = new_match();
        let first = attempt_for(&m, 10);
        m.apply_attempt(0, first).unwrap();

        let stale = attempt_for(&m, 10);
        let err = m.apply_attempt(0, stale).unwrap_err();
        assert!(matches!(err, ChampionshipError::ConcurrentModification(_)));
        assert_eq!(m.attempt_count, 1);
        assert_eq!(m.score_a, 10);
    }

    #[test]
    fn test_full_match_rejects_more() {
        let mut m = new_match();
        for count in 0..ATTEMPTS_PER_MATCH {
            let a = attempt_for(&m, 0);
            m.apply_attempt(count, a).unwrap();
        }
        let extra = attempt_for(&m, 0);
        assert!(matches!(
            m.apply_attempt(ATTEMPTS_PER_MATCH, extra),
            Err(ChampionshipError::AlreadyComplete(_))
        ));
    }

    #[test]
    fn test_winner_rules() {
        assert_eq!(decide_winner(30, 20), (Side::A, false));
        assert_eq!(decide_winner(20, 30), (Side::B, false));
        assert_eq!(decide_winner(25, 25), (Side::A, true));
        assert_eq!(decide_winner(0, 0), (Side::A, true));
    }

    #[test]
    fn test_result_requires_full_match() {
        let m = new_match();
        assert!(matches!(
            MatchResult::from_match(&m),
            Err(ChampionshipError::MatchNotFinished { attempt_count: 0, .. })
        ));
    }
}
