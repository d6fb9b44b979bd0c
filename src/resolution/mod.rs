//! Attempt outcome resolution
//!
//! One attempt pits an attacking roster member against a defending one:
//!
//! `end_value = offense - defense + matchup_bonus + roll`
//!
//! Below [`OFFENSE_THRESHOLD`] the defender holds and nothing is scored.
//! At or above it, the attacker's sport table decides the points.

pub mod outcome;
pub mod roll;
pub mod rules;

pub use outcome::{end_value, resolve, resolve_with_roll, Outcome, OutcomeKind};
pub use roll::{FixedRolls, RollSource, ROLL_MAX, ROLL_MIN};
pub use rules::{MatchupTable, RankingBucket, RuleBook, SportTables};

/// Lowest end value that counts as an offensive success (inclusive)
pub const OFFENSE_THRESHOLD: i32 = 100;
