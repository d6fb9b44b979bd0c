//! Engine configuration with documented defaults
//!
//! The values here only shape how the engine is driven. Match structure
//! (72 attempts, 6 per round) is fixed and lives in [`crate::matches`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{ChampionshipError, Result};
use crate::resolution::RuleBook;

/// How far each open match advances on a single `tick()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// One attempt per match per tick
    #[default]
    Attempt,
    /// Finish the current round (up to 6 attempts) per match per tick
    Round,
}

/// Configuration for the championship engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Advancement granularity used by `tick()`
    pub tick_mode: TickMode,

    /// Seed for attempt rolls
    ///
    /// `None` draws a fresh seed when a championship starts. The chosen
    /// seed is recorded in the championship state either way, so a run can
    /// be replayed.
    pub seed: Option<u64>,

    /// Minimum number of open matches before a tick advances them in parallel
    ///
    /// Below this, the rayon fork/join overhead outweighs the work of a
    /// handful of attempts.
    pub parallel_threshold: usize,

    /// Optional TOML file overriding the built-in rule book
    pub rules_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_mode: TickMode::Attempt,
            seed: None,
            parallel_threshold: 16,
            rules_path: None,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.parallel_threshold == 0 {
            return Err("parallel_threshold must be at least 1".into());
        }

        if let Some(path) = &self.rules_path {
            if path.as_os_str().is_empty() {
                return Err("rules_path must not be empty when set".into());
            }
        }

        Ok(())
    }

    /// Load a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a config from a TOML string; missing keys take their defaults
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ChampionshipError::Config(e.to_string()))?;
        config.validate().map_err(ChampionshipError::Config)?;
        Ok(config)
    }

    /// The rule book this config selects: the TOML override if one is set,
    /// otherwise the built-in tables
    pub fn rule_book(&self) -> Result<RuleBook> {
        match &self.rules_path {
            Some(path) => RuleBook::load_from_toml(path),
            None => Ok(RuleBook::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_mode, TickMode::Attempt);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = EngineConfig::parse_toml("tick_mode = \"round\"\nseed = 42\n").unwrap();
        assert_eq!(config.tick_mode, TickMode::Round);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.parallel_threshold, 16);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = EngineConfig::parse_toml("parallel_threshold = 0").unwrap_err();
        assert!(matches!(err, ChampionshipError::Config(_)));
    }

    #[test]
    fn test_unknown_tick_mode_rejected() {
        assert!(EngineConfig::parse_toml("tick_mode = \"stage\"").is_err());
    }
}
