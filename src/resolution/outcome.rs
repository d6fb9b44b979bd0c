//! The resolver itself

use serde::{Deserialize, Serialize};

use crate::core::error::{ChampionshipError, Result};
use crate::core::types::Points;
use crate::resolution::{RollSource, RuleBook, OFFENSE_THRESHOLD};
use crate::roster::RosterMember;

/// Which side won the attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    OffensiveSuccess,
    DefensiveSuccess,
}

/// Result of one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// Points for the attacking side (0 on a defensive success)
    pub points: Points,
    /// Action tag from the ranking table ("homerun", "block", ...)
    pub action: String,
    pub description: String,
    pub roll: i32,
    pub end_value: i32,
}

impl Outcome {
    pub fn is_offensive_success(&self) -> bool {
        self.kind == OutcomeKind::OffensiveSuccess
    }
}

/// `offense - defense + matchup bonus + roll`, saturating at the `i32` bounds
pub fn end_value(
    rules: &RuleBook,
    attacker: &RosterMember,
    defender: &RosterMember,
    roll: i32,
) -> i32 {
    attacker
        .offensive_strength
        .saturating_sub(defender.defensive_strength)
        .saturating_add(rules.matchup.bonus(attacker.sport, defender.sport))
        .saturating_add(roll)
}

/// Resolve an attempt, drawing one roll from `rolls`
pub fn resolve(
    rules: &RuleBook,
    attacker: &RosterMember,
    defender: &RosterMember,
    rolls: &mut impl RollSource,
) -> Result<Outcome> {
    let roll = rolls.roll();
    resolve_with_roll(rules, attacker, defender, roll)
}

/// Resolve an attempt for a known roll
///
/// Fails with `UnresolvedOutcomeBucket` when no bucket covers the end value;
/// that only happens with a rule book that skipped validation.
pub fn resolve_with_roll(
    rules: &RuleBook,
    attacker: &RosterMember,
    defender: &RosterMember,
    roll: i32,
) -> Result<Outcome> {
    let value = end_value(rules, attacker, defender, roll);

    if value < OFFENSE_THRESHOLD {
        let bucket = rules
            .defense
            .get(defender.sport)
            .iter()
            .find(|b| b.contains(value))
            .ok_or(ChampionshipError::UnresolvedOutcomeBucket {
                sport: defender.sport,
                end_value: value,
            })?;

        return Ok(Outcome {
            kind: OutcomeKind::DefensiveSuccess,
            points: 0,
            action: bucket.action.clone(),
            description: format!(
                "{} ({}) made a {} to stop {} ({})",
                defender.name, defender.sport, bucket.action, attacker.name, attacker.sport
            ),
            roll,
            end_value: value,
        });
    }

    let bucket = rules
        .offense
        .get(attacker.sport)
        .iter()
        .find(|b| b.contains(value))
        .ok_or(ChampionshipError::UnresolvedOutcomeBucket {
            sport: attacker.sport,
            end_value: value,
        })?;

    Ok(Outcome {
        kind: OutcomeKind::OffensiveSuccess,
        points: bucket.points,
        action: bucket.action.clone(),
        description: format!(
            "{} ({}) {} against {} ({}) for {} points",
            attacker.name, attacker.sport, bucket.action, defender.name, defender.sport, bucket.points
        ),
        roll,
        end_value: value,
    })
}
