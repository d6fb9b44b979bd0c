pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, TickMode};
pub use error::{ChampionshipError, Result};
pub use types::{AttemptId, EntrantId, MatchId, MemberId, Points, Side};
