//! Standings aggregation
//!
//! Totals are the sum of each entrant's points over finalized matches.
//! Ordering is by total, descending; equal totals keep encounter order
//! (entrant list first, then first appearance in results), so folding
//! results one at a time and recomputing from scratch agree exactly.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntrantId, Points};
use crate::matches::MatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub entrant: EntrantId,
    pub points: Points,
    /// Encounter order, used to break ties
    pub order: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    entries: Vec<Standing>,
}

impl Standings {
    /// Zeroed standings for every entrant, in entrant order
    pub fn new(entrants: &[EntrantId]) -> Self {
        let mut standings = Self::default();
        for &entrant in entrants {
            standings.entry_mut(entrant);
        }
        standings
    }

    /// Standings from scratch over a full result list
    pub fn recompute(entrants: &[EntrantId], results: &[MatchResult]) -> Self {
        let mut standings = Self::new(entrants);
        for result in results {
            standings.apply(result);
        }
        standings
    }

    /// Fold one finalized match into the standings
    pub fn apply(&mut self, result: &MatchResult) {
        self.entry_mut(result.pairing.side_a).points += result.score_a;
        self.entry_mut(result.pairing.side_b).points += result.score_b;
        self.entries
            .sort_by(|a, b| b.points.cmp(&a.points).then(a.order.cmp(&b.order)));
    }

    pub fn entries(&self) -> &[Standing] {
        &self.entries
    }

    pub fn points_for(&self, entrant: EntrantId) -> Option<Points> {
        self.entries
            .iter()
            .find(|s| s.entrant == entrant)
            .map(|s| s.points)
    }

    pub fn leader(&self) -> Option<&Standing> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, entrant: EntrantId) -> &mut Standing {
        let index = match self.entries.iter().position(|s| s.entrant == entrant) {
            Some(index) => index,
            None => {
                let order = self.entries.len();
                self.entries.push(Standing {
                    entrant,
                    points: 0,
                    order,
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }
}
