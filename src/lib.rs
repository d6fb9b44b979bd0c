//! Championship - round-robin tournament engine
//!
//! Entrants field five-member rosters across three sports. A championship
//! schedules every pair of entrants to meet once, and each match is played
//! out attempt by attempt as the driver ticks the [`championship::Orchestrator`].

pub mod championship;
pub mod core;
pub mod matches;
pub mod resolution;
pub mod roster;
pub mod schedule;
pub mod store;
