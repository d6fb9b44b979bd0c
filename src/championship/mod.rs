//! Championship lifecycle and standings

pub mod orchestrator;
pub mod standings;
pub mod state;

pub use orchestrator::{MatchFailure, Orchestrator, StartSummary, TickReport};
pub use standings::{Standing, Standings};
pub use state::{ChampionshipPhase, ChampionshipState};
