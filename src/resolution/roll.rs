//! Injected randomness for attempt resolution

use rand::Rng;

/// Inclusive bounds of a single roll (a d100)
pub const ROLL_MIN: i32 = 1;
pub const ROLL_MAX: i32 = 100;

/// Source of d100 rolls
///
/// Every `rand::Rng` is a roll source. Tests pin rolls with [`FixedRolls`].
pub trait RollSource {
    /// Next roll in `ROLL_MIN..=ROLL_MAX`
    fn roll(&mut self) -> i32;
}

impl<R: Rng> RollSource for R {
    fn roll(&mut self) -> i32 {
        self.gen_range(ROLL_MIN..=ROLL_MAX)
    }
}

/// Replays a fixed sequence of rolls, cycling when exhausted
#[derive(Debug, Clone)]
pub struct FixedRolls {
    rolls: Vec<i32>,
    next: usize,
}

impl FixedRolls {
    /// Rolls are clamped into the d100 range. An empty sequence rolls `ROLL_MIN`.
    pub fn new(rolls: Vec<i32>) -> Self {
        let rolls = rolls
            .into_iter()
            .map(|r| r.clamp(ROLL_MIN, ROLL_MAX))
            .collect();
        Self { rolls, next: 0 }
    }

    pub fn constant(roll: i32) -> Self {
        Self::new(vec![roll])
    }
}

impl RollSource for FixedRolls {
    fn roll(&mut self) -> i32 {
        if self.rolls.is_empty() {
            return ROLL_MIN;
        }
        let value = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        value
    }
}
