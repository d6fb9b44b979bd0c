//! Demo roster generation
//!
//! Used by the driver binary to fill a store with bot entrants, and by tests.
//! Every generated roster passes `Roster::validate`.

use rand::Rng;

use crate::roster::{
    Roster, RosterMember, Sport, MAX_ROSTER_STARS, MAX_STAR_TIER, MIN_STAR_TIER, ROSTER_SIZE,
};

// === STRENGTH CONSTANTS ===

/// Strength contributed per star tier
const STRENGTH_PER_STAR: i32 = 10;

/// Base strength before star tiers
const BASE_STRENGTH: i32 = 20;

/// Random spread added on top of the tiered strength
const STRENGTH_SPREAD: i32 = 15;

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Casey", "Riley", "Morgan", "Quinn", "Avery", "Rowan", "Sage", "Emery",
];

const LAST_NAMES: &[&str] = &[
    "Hart", "Vale", "Stone", "Reyes", "Okafor", "Lind", "Moreau", "Park", "Silva", "Novak",
];

/// Spread `total` stars over `slots` members, each between the tier bounds.
///
/// Every slot starts at the minimum tier and the remainder is dealt out one
/// star at a time, front to back, skipping full slots.
pub fn distribute_star_tiers(total: u32, slots: usize) -> Vec<u8> {
    let mut tiers = vec![MIN_STAR_TIER; slots];
    let capacity = slots as u32 * MAX_STAR_TIER as u32;
    let floor = slots as u32 * MIN_STAR_TIER as u32;
    let mut remaining = total.clamp(floor, capacity) - floor;

    while remaining > 0 {
        for tier in tiers.iter_mut() {
            if remaining == 0 {
                break;
            }
            if *tier < MAX_STAR_TIER {
                *tier += 1;
                remaining -= 1;
            }
        }
    }

    tiers
}

/// Generate a full-budget roster with random sports, names and strengths.
pub fn generate_roster(rng: &mut impl Rng) -> Roster {
    let tiers = distribute_star_tiers(MAX_ROSTER_STARS, ROSTER_SIZE);

    let members = tiers
        .into_iter()
        .map(|tier| {
            let sport = Sport::ALL[rng.gen_range(0..Sport::ALL.len())];
            let name = format!(
                "{} {}",
                FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
                LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
            );
            let tiered = BASE_STRENGTH + tier as i32 * STRENGTH_PER_STAR;
            RosterMember::new(
                name,
                sport,
                tier,
                tiered + rng.gen_range(0..=STRENGTH_SPREAD),
                tiered + rng.gen_range(0..=STRENGTH_SPREAD),
            )
        })
        .collect();

    Roster::new(members)
}
