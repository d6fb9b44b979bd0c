//! Round-robin stage scheduling (circle method)
//!
//! The first entrant stays fixed while the rest rotate one seat per stage.
//! With `n` entrants this yields `n - 1` stages of `n / 2` pairings in which
//! every entrant plays once per stage and every pair meets exactly once.

use serde::{Deserialize, Serialize};

use crate::core::error::{ChampionshipError, Result};
use crate::core::types::{EntrantId, Side};

/// Two entrants drawn together for one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    pub side_a: EntrantId,
    pub side_b: EntrantId,
}

impl Pairing {
    pub fn new(side_a: EntrantId, side_b: EntrantId) -> Self {
        Self { side_a, side_b }
    }

    pub fn entrant(&self, side: Side) -> EntrantId {
        match side {
            Side::A => self.side_a,
            Side::B => self.side_b,
        }
    }

    pub fn involves(&self, entrant: EntrantId) -> bool {
        self.side_a == entrant || self.side_b == entrant
    }

    /// Order-independent key, for checking that pairs are not repeated
    pub fn unordered(&self) -> (EntrantId, EntrantId) {
        if self.side_a <= self.side_b {
            (self.side_a, self.side_b)
        } else {
            (self.side_b, self.side_a)
        }
    }
}

/// Every pairing of one stage
pub type Stage = Vec<Pairing>;

/// Build the full stage schedule for an even, ordered entrant list.
pub fn round_robin(entrants: &[EntrantId]) -> Result<Vec<Stage>> {
    let n = entrants.len();
    if n < 2 || n % 2 != 0 {
        return Err(ChampionshipError::InvalidEntrantCount { count: n });
    }
    for (i, id) in entrants.iter().enumerate() {
        if entrants[..i].contains(id) {
            return Err(ChampionshipError::DuplicateEntrant(*id));
        }
    }

    let mut seats = entrants.to_vec();
    let mut stages = Vec::with_capacity(n - 1);

    for _ in 0..n - 1 {
        let stage = (0..n / 2)
            .map(|i| Pairing::new(seats[i], seats[n - 1 - i]))
            .collect();
        stages.push(stage);

        // Seat 0 stays put; the last seat moves to seat 1
        seats[1..].rotate_right(1);
    }

    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(n: usize) -> Vec<EntrantId> {
        (0..n).map(|_| EntrantId::new()).collect()
    }

    #[test]
    fn test_four_entrants_exact_order() {
        let e = ids(4);
        let (a, b, c, d) = (e[0], e[1], e[2], e[3]);

        let stages = round_robin(&e).unwrap();
        assert_eq!(
            stages,
            vec![
                vec![Pairing::new(a, d), Pairing::new(b, c)],
                vec![Pairing::new(a, c), Pairing::new(d, b)],
                vec![Pairing::new(a, b), Pairing::new(c, d)],
            ]
        );
    }

    #[test]
    fn test_two_entrants_single_stage() {
        let e = ids(2);
        let stages = round_robin(&e).unwrap();
        assert_eq!(stages, vec![vec![Pairing::new(e[0], e[1])]]);
    }

    #[test]
    fn test_invalid_counts() {
        for n in [0, 1, 3, 5, 9] {
            assert!(matches!(
                round_robin(&ids(n)),
                Err(ChampionshipError::InvalidEntrantCount { count }) if count == n
            ));
        }
    }

    #[test]
    fn test_duplicate_entrant_rejected() {
        let e = ids(3);
        let listed = vec![e[0], e[1], e[2], e[1]];
        assert!(matches!(
            round_robin(&listed),
            Err(ChampionshipError::DuplicateEntrant(id)) if id == e[1]
        ));
    }

    #[test]
    fn test_every_pair_meets_once() {
        let e = ids(10);
        let stages = round_robin(&e).unwrap();
        let mut seen = HashSet::new();
        for stage in &stages {
            for pairing in stage {
                assert!(seen.insert(pairing.unordered()));
            }
        }
        assert_eq!(seen.len(), 10 * 9 / 2);
    }
}
