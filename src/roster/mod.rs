//! Entrants and their rosters
//!
//! Rosters are built outside the engine; the engine only reads them. The
//! validation here backs the store's registration path.

pub mod generation;

use serde::{Deserialize, Serialize};

use crate::core::error::{ChampionshipError, Result};
use crate::core::types::{EntrantId, MemberId};

pub use generation::{distribute_star_tiers, generate_roster};

/// Members on every roster
pub const ROSTER_SIZE: usize = 5;

/// Star tier budget shared by a whole roster
pub const MAX_ROSTER_STARS: u32 = 14;

/// Star tier bounds for a single member
pub const MIN_STAR_TIER: u8 = 1;
pub const MAX_STAR_TIER: u8 = 5;

/// Sport category of a roster member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Baseball,
    Basketball,
    Soccer,
}

impl Sport {
    pub const ALL: [Sport; 3] = [Sport::Baseball, Sport::Basketball, Sport::Soccer];

    /// Row/column index into per-sport tables
    pub fn index(self) -> usize {
        match self {
            Sport::Baseball => 0,
            Sport::Basketball => 1,
            Sport::Soccer => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Sport::Baseball => "Baseball",
            Sport::Basketball => "Basketball",
            Sport::Soccer => "Soccer",
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single competitive unit on a roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterMember {
    pub id: MemberId,
    pub name: String,
    pub sport: Sport,
    pub star_tier: u8,
    pub offensive_strength: i32,
    pub defensive_strength: i32,
}

impl RosterMember {
    pub fn new(
        name: impl Into<String>,
        sport: Sport,
        star_tier: u8,
        offensive_strength: i32,
        defensive_strength: i32,
    ) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            sport,
            star_tier,
            offensive_strength,
            defensive_strength,
        }
    }
}

/// Ordered list of roster members
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<RosterMember>,
}

impl Roster {
    pub fn new(members: Vec<RosterMember>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[RosterMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member selected for the given attempt count (cycles through the roster)
    pub fn cyclic_member(&self, attempt_count: u8) -> Option<&RosterMember> {
        if self.members.is_empty() {
            return None;
        }
        self.members.get(attempt_count as usize % self.members.len())
    }

    pub fn total_stars(&self) -> u32 {
        self.members.iter().map(|m| m.star_tier as u32).sum()
    }

    /// Check size, per-member star tier and the shared star budget
    pub fn validate(&self) -> Result<()> {
        if self.members.len() != ROSTER_SIZE {
            return Err(ChampionshipError::InvalidRoster(format!(
                "roster has {} members, expected {}",
                self.members.len(),
                ROSTER_SIZE
            )));
        }

        if let Some(member) = self
            .members
            .iter()
            .find(|m| !(MIN_STAR_TIER..=MAX_STAR_TIER).contains(&m.star_tier))
        {
            return Err(ChampionshipError::InvalidRoster(format!(
                "{} has star tier {}",
                member.name, member.star_tier
            )));
        }

        let stars = self.total_stars();
        if stars > MAX_ROSTER_STARS {
            return Err(ChampionshipError::InvalidRoster(format!(
                "roster uses {} stars, budget is {}",
                stars, MAX_ROSTER_STARS
            )));
        }

        Ok(())
    }
}

/// A championship participant (human or bot-controlled)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub name: String,
    pub roster: Roster,
    /// Entered into the upcoming championship
    pub entered: bool,
}

impl Entrant {
    pub fn new(name: impl Into<String>, roster: Roster) -> Self {
        Self {
            id: EntrantId::new(),
            name: name.into(),
            roster,
            entered: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(tier: u8) -> RosterMember {
        RosterMember::new("Test", Sport::Soccer, tier, 50, 40)
    }

    #[test]
    fn test_valid_roster() {
        let roster = Roster::new(vec![member(3), member(3), member(3), member(3), member(2)]);
        assert_eq!(roster.total_stars(), 14);
        assert!(roster.validate().is_ok());
    }

    #[test]
    fn test_star_budget_exceeded() {
        let roster = Roster::new(vec![member(3), member(3), member(3), member(3), member(3)]);
        assert!(matches!(
            roster.validate(),
            Err(ChampionshipError::InvalidRoster(_))
        ));
    }

    #[test]
    fn test_wrong_size() {
        let roster = Roster::new(vec![member(1); 4]);
        assert!(roster.validate().is_err());
    }

    #[test]
    fn test_star_tier_out_of_range() {
        let roster = Roster::new(vec![member(0), member(1), member(1), member(1), member(1)]);
        assert!(roster.validate().is_err());
    }

    #[test]
    fn test_cyclic_member_wraps() {
        let members: Vec<_> = (0..5).map(|_| member(1)).collect();
        let roster = Roster::new(members.clone());
        assert_eq!(roster.cyclic_member(0).unwrap().id, members[0].id);
        assert_eq!(roster.cyclic_member(7).unwrap().id, members[2].id);
        assert_eq!(roster.cyclic_member(71).unwrap().id, members[1].id);
        assert!(Roster::default().cyclic_member(3).is_none());
    }
}
