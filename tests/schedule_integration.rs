//! Integration tests for round-robin scheduling
//!
//! These tests verify the shape of the stage schedule for any even field:
//! - n - 1 stages of n / 2 pairings
//! - every entrant plays exactly once per stage
//! - every unordered pair meets exactly once across the schedule

use std::collections::HashSet;

use championship::core::error::ChampionshipError;
use championship::core::types::EntrantId;
use championship::schedule::round_robin;
use proptest::prelude::*;

fn ids(n: usize) -> Vec<EntrantId> {
    (0..n).map(|_| EntrantId::new()).collect()
}

// ============================================================================
// Fixed Examples
// ============================================================================

#[test]
fn test_six_entrant_schedule_shape() {
    let entrants = ids(6);
    let stages = round_robin(&entrants).unwrap();

    assert_eq!(stages.len(), 5);
    for stage in &stages {
        assert_eq!(stage.len(), 3);
    }
    // The first entrant keeps seat 0 and is always side A
    for stage in &stages {
        assert_eq!(stage[0].side_a, entrants[0]);
    }
}

#[test]
fn test_odd_field_rejected() {
    let err = round_robin(&ids(7)).unwrap_err();
    assert!(matches!(err, ChampionshipError::InvalidEntrantCount { count: 7 }));
}

#[test]
fn test_schedule_is_deterministic() {
    let entrants = ids(8);
    assert_eq!(round_robin(&entrants).unwrap(), round_robin(&entrants).unwrap());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_even_field_plays_everyone_once(half in 1usize..=12) {
        let n = half * 2;
        let entrants = ids(n);
        let stages = round_robin(&entrants).unwrap();

        prop_assert_eq!(stages.len(), n - 1);

        let mut pairs = HashSet::new();
        for stage in &stages {
            prop_assert_eq!(stage.len(), n / 2);

            let mut seen = HashSet::new();
            for pairing in stage {
                prop_assert!(pairing.side_a != pairing.side_b);
                prop_assert!(seen.insert(pairing.side_a));
                prop_assert!(seen.insert(pairing.side_b));
                prop_assert!(pairs.insert(pairing.unordered()));
            }
            prop_assert_eq!(seen.len(), n);
        }
        prop_assert_eq!(pairs.len(), n * (n - 1) / 2);
    }

    #[test]
    fn prop_odd_field_rejected(half in 0usize..=12) {
        let n = half * 2 + 1;
        let rejected = matches!(
            round_robin(&ids(n)),
            Err(ChampionshipError::InvalidEntrantCount { count }) if count == n
        );
        prop_assert!(rejected);
    }
}
