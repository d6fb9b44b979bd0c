//! Ongoing matches and their attempt-by-attempt state machine
//!
//! A match is 12 rounds of 6 attempts. Side A attacks in odd rounds, side B
//! in even rounds.

pub mod machine;
pub mod state;

pub use machine::{
    advance_one_attempt, advance_seeded, attempt_rng, attempts_to_round_end, finalize,
    match_seed, open, AdvanceOutcome,
};
pub use state::{decide_winner, Attempt, MatchPhase, MatchResult, NewMatch, OngoingMatch};

pub const ATTEMPTS_PER_ROUND: u8 = 6;
pub const ROUNDS_PER_MATCH: u8 = 12;
pub const ATTEMPTS_PER_MATCH: u8 = ATTEMPTS_PER_ROUND * ROUNDS_PER_MATCH;
