//! Matchup bonuses and ranking tables
//!
//! The built-in tables are the game's canonical rules. A TOML file can
//! replace them; loaded tables are validated so every reachable end value
//! lands in exactly one bucket.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ChampionshipError, Result};
use crate::core::types::Points;
use crate::resolution::OFFENSE_THRESHOLD;
use crate::roster::Sport;

/// One `[min, max]` band of end values (both inclusive, `None` = unbounded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingBucket {
    #[serde(default)]
    pub min: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
    pub points: Points,
    pub action: String,
}

impl RankingBucket {
    pub fn new(min: Option<i32>, max: Option<i32>, points: Points, action: &str) -> Self {
        Self {
            min,
            max,
            points,
            action: action.to_string(),
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Additive bonus by (attacker sport, defender sport)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupTable {
    /// Rows are the attacker's sport, columns the defender's, in `Sport::ALL` order
    pub bonus: [[i32; 3]; 3],
}

impl MatchupTable {
    pub fn bonus(&self, attacker: Sport, defender: Sport) -> i32 {
        self.bonus[attacker.index()][defender.index()]
    }
}

impl Default for MatchupTable {
    fn default() -> Self {
        Self {
            bonus: [
                // vs Baseball, Basketball, Soccer
                [10, 20, 40], // Baseball attacking
                [40, 10, 20], // Basketball attacking
                [20, 40, 10], // Soccer attacking
            ],
        }
    }
}

/// One ranking table per sport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportTables {
    pub baseball: Vec<RankingBucket>,
    pub basketball: Vec<RankingBucket>,
    pub soccer: Vec<RankingBucket>,
}

impl SportTables {
    pub fn get(&self, sport: Sport) -> &[RankingBucket] {
        match sport {
            Sport::Baseball => &self.baseball,
            Sport::Basketball => &self.basketball,
            Sport::Soccer => &self.soccer,
        }
    }

    /// Built-in offensive tables, scored from `OFFENSE_THRESHOLD` upwards
    pub fn default_offense() -> Self {
        Self {
            baseball: vec![
                RankingBucket::new(Some(100), Some(135), 10, "single"),
                RankingBucket::new(Some(136), Some(165), 20, "double"),
                RankingBucket::new(Some(166), Some(250), 30, "triple"),
                RankingBucket::new(Some(251), None, 50, "homerun"),
            ],
            basketball: vec![
                RankingBucket::new(Some(100), Some(145), 10, "rebound"),
                RankingBucket::new(Some(146), Some(225), 15, "basket"),
                RankingBucket::new(Some(226), None, 30, "three-pointer"),
            ],
            soccer: vec![
                RankingBucket::new(Some(100), Some(145), 10, "pass"),
                RankingBucket::new(Some(146), Some(285), 25, "assist"),
                RankingBucket::new(Some(286), None, 65, "goal"),
            ],
        }
    }

    /// Built-in defensive tables, everything below `OFFENSE_THRESHOLD`
    pub fn default_defense() -> Self {
        Self {
            baseball: vec![
                RankingBucket::new(None, Some(19), 0, "catch"),
                RankingBucket::new(Some(20), Some(39), 0, "block"),
                RankingBucket::new(Some(40), Some(59), 0, "intercept"),
                RankingBucket::new(Some(60), Some(79), 0, "dive"),
                RankingBucket::new(Some(80), Some(99), 0, "leap"),
            ],
            basketball: vec![
                RankingBucket::new(None, Some(24), 0, "block"),
                RankingBucket::new(Some(25), Some(49), 0, "deflection"),
                RankingBucket::new(Some(50), Some(74), 0, "save"),
                RankingBucket::new(Some(75), Some(99), 0, "interception"),
            ],
            soccer: vec![
                RankingBucket::new(None, Some(24), 0, "block"),
                RankingBucket::new(Some(25), Some(49), 0, "deflection"),
                RankingBucket::new(Some(50), Some(74), 0, "interception"),
                RankingBucket::new(Some(75), Some(99), 0, "save"),
            ],
        }
    }
}

/// Complete set of rules used by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleBook {
    pub matchup: MatchupTable,
    pub offense: SportTables,
    pub defense: SportTables,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self {
            matchup: MatchupTable::default(),
            offense: SportTables::default_offense(),
            defense: SportTables::default_defense(),
        }
    }
}

impl RuleBook {
    /// Load a rule book from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a rule book from TOML; omitted sections keep the built-in tables
    pub fn parse_toml(content: &str) -> Result<Self> {
        let rules: RuleBook =
            toml::from_str(content).map_err(|e| ChampionshipError::InvalidRules(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Every table must tile its half of the number line exactly:
    /// offense covers `[OFFENSE_THRESHOLD, ∞)`, defense covers `(-∞, OFFENSE_THRESHOLD)`.
    pub fn validate(&self) -> Result<()> {
        for sport in Sport::ALL {
            validate_table(
                "offense",
                sport,
                self.offense.get(sport),
                Some(OFFENSE_THRESHOLD),
                None,
            )?;
            validate_table(
                "defense",
                sport,
                self.defense.get(sport),
                None,
                Some(OFFENSE_THRESHOLD - 1),
            )?;

            if self.defense.get(sport).iter().any(|b| b.points > 0) {
                return Err(ChampionshipError::InvalidRules(format!(
                    "defense {} buckets must award 0 points",
                    sport
                )));
            }
        }
        Ok(())
    }
}

fn validate_table(
    label: &str,
    sport: Sport,
    buckets: &[RankingBucket],
    lower: Option<i32>,
    upper: Option<i32>,
) -> Result<()> {
    let fail = |msg: String| {
        Err(ChampionshipError::InvalidRules(format!(
            "{} {}: {}",
            label, sport, msg
        )))
    };

    let (first, last) = match (buckets.first(), buckets.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return fail("table is empty".into()),
    };

    if first.min != lower {
        return fail(format!("first bucket must start at {:?}", lower));
    }
    if last.max != upper {
        return fail(format!("last bucket must end at {:?}", upper));
    }

    for bucket in buckets {
        if let (Some(min), Some(max)) = (bucket.min, bucket.max) {
            if min > max {
                return fail(format!("bucket '{}' has min {} > max {}", bucket.action, min, max));
            }
        }
    }

    for pair in buckets.windows(2) {
        match (pair[0].max, pair[1].min) {
            (Some(max), Some(min)) if max.checked_add(1) == Some(min) => {}
            _ => {
                return fail(format!(
                    "buckets '{}' and '{}' are not contiguous",
                    pair[0].action, pair[1].action
                ))
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_validate() {
        assert!(RuleBook::default().validate().is_ok());
    }

    #[test]
    fn test_matchup_table_values() {
        let table = MatchupTable::default();
        for sport in Sport::ALL {
            assert_eq!(table.bonus(sport, sport), 10);
        }
        assert_eq!(table.bonus(Sport::Baseball, Sport::Basketball), 20);
        assert_eq!(table.bonus(Sport::Baseball, Sport::Soccer), 40);
        assert_eq!(table.bonus(Sport::Basketball, Sport::Baseball), 40);
        assert_eq!(table.bonus(Sport::Basketball, Sport::Soccer), 20);
        assert_eq!(table.bonus(Sport::Soccer, Sport::Baseball), 20);
        assert_eq!(table.bonus(Sport::Soccer, Sport::Basketball), 40);
    }

    #[test]
    fn test_each_sport_has_one_favorable_and_one_unfavorable_matchup() {
        let table = MatchupTable::default();
        for attacker in Sport::ALL {
            let others: Vec<i32> = Sport::ALL
                .iter()
                .filter(|d| **d != attacker)
                .map(|d| table.bonus(attacker, *d))
                .collect();
            assert!(others.contains(&40));
            assert!(others.contains(&20));
        }
    }

    #[test]
    fn test_gap_rejected() {
        let mut rules = RuleBook::default();
        rules.offense.soccer[1].min = Some(150);
        assert!(matches!(
            rules.validate(),
            Err(ChampionshipError::InvalidRules(_))
        ));
    }

    #[test]
    fn test_overlap_rejected() {
        let mut rules = RuleBook::default();
        rules.defense.baseball[2].min = Some(35);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_open_ended_offense_required() {
        let mut rules = RuleBook::default();
        rules.offense.basketball[2].max = Some(1000);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_parse_toml_override_keeps_other_sections() {
        let toml_str = r#"
            [matchup]
            bonus = [[0, 0, 0], [0, 0, 0], [0, 0, 0]]
        "#;
        let rules = RuleBook::parse_toml(toml_str).unwrap();
        assert_eq!(rules.matchup.bonus(Sport::Baseball, Sport::Soccer), 0);
        assert_eq!(rules.offense, SportTables::default_offense());
        assert_eq!(rules.defense, SportTables::default_defense());
    }

    #[test]
    fn test_parse_toml_offense_tables() {
        let toml_str = r#"
            [[offense.baseball]]
            min = 100
            points = 5
            action = "bunt"

            [[offense.basketball]]
            min = 100
            points = 5
            action = "layup"

            [[offense.soccer]]
            min = 100
            max = 199
            points = 5
            action = "cross"

            [[offense.soccer]]
            min = 200
            points = 50
            action = "goal"
        "#;
        let rules = RuleBook::parse_toml(toml_str).unwrap();
        assert_eq!(rules.offense.get(Sport::Soccer).len(), 2);
        assert_eq!(rules.offense.get(Sport::Baseball)[0].action, "bunt");
    }

    #[test]
    fn test_parse_toml_invalid_table() {
        let toml_str = r#"
            [[offense.baseball]]
            min = 120
            points = 5
            action = "bunt"

            [[offense.basketball]]
            min = 100
            points = 5
            action = "layup"

            [[offense.soccer]]
            min = 100
            points = 5
            action = "goal"
        "#;
        assert!(RuleBook::parse_toml(toml_str).is_err());
    }
}
