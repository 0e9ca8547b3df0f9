//! HUD readouts
//!
//! Estimates the numeric battle counters (energy, gold, refresh cost,
//! population) from the frame. The game never exposed these as readable
//! text and OCR is out of scope, so each estimator anchors on the presence
//! of the relevant icon and fills in a randomized estimate, exactly like
//! the tool this replaces. Unit detection fabricates positions inside the
//! battle area the same way.
//!
//! Every estimator takes the RNG as a parameter so tests can seed it.

use rand::Rng;

use crate::game::board::BattleArea;

/// Gold reported when the coin icon cannot be located
pub const DEFAULT_GOLD: u32 = 50;
/// Refresh cost reported when the refresh button cannot be located
pub const DEFAULT_REFRESH_COST: u32 = 2;
/// Population reported when the population icon cannot be located
pub const DEFAULT_POPULATION: (u32, u32) = (3, 6);

/// One poll's worth of estimated battle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HudReadout {
    /// Energy estimate, 0-10
    pub energy: u32,
    /// Gold estimate
    pub gold: u32,
    /// Shop refresh cost estimate
    pub refresh_cost: u32,
    /// Current population estimate
    pub population: u32,
    /// Population cap estimate
    pub population_limit: u32,
}

/// Estimate current energy.
///
/// 10 when the full-bar indicator is on screen, otherwise a mid-range
/// estimate.
pub fn estimate_energy<R: Rng>(energy_full_visible: bool, rng: &mut R) -> u32 {
    if energy_full_visible {
        return 10;
    }
    rng.random_range(5..=9)
}

/// Estimate current gold from the coin icon's presence
pub fn estimate_gold<R: Rng>(coin_visible: bool, rng: &mut R) -> u32 {
    if !coin_visible {
        log::warn!("gold icon not found, using default of {}", DEFAULT_GOLD);
        return DEFAULT_GOLD;
    }
    let gold = rng.random_range(30..=100);
    log::debug!("gold estimate: {}", gold);
    gold
}

/// Estimate the shop refresh cost from the refresh button's presence
pub fn estimate_refresh_cost<R: Rng>(refresh_visible: bool, rng: &mut R) -> u32 {
    if !refresh_visible {
        log::warn!(
            "refresh button not found, using default cost of {}",
            DEFAULT_REFRESH_COST
        );
        return DEFAULT_REFRESH_COST;
    }
    let cost = rng.random_range(1..=5);
    log::debug!("refresh cost estimate: {}", cost);
    cost
}

/// Estimate current population and the population cap.
///
/// The current value never exceeds the cap.
pub fn estimate_population<R: Rng>(icon_visible: bool, rng: &mut R) -> (u32, u32) {
    if !icon_visible {
        log::warn!(
            "population icon not found, using default of {}/{}",
            DEFAULT_POPULATION.0,
            DEFAULT_POPULATION.1
        );
        return DEFAULT_POPULATION;
    }
    let population = rng.random_range(1..=5);
    let limit = rng.random_range(population..=10);
    log::debug!("population estimate: {}/{}", population, limit);
    (population, limit)
}

/// Fabricate ally positions in the lower half of the battle area
pub fn fabricate_ally_units<R: Rng>(area: &BattleArea, rng: &mut R) -> Vec<(i32, i32)> {
    let count = rng.random_range(1..=3);
    (0..count)
        .map(|_| {
            let x = area.left + rng.random_range(0..=area.width);
            let y = area.top + rng.random_range(area.height / 2..=area.height);
            (x, y)
        })
        .collect()
}

/// Fabricate enemy positions in the upper half of the battle area
pub fn fabricate_enemy_units<R: Rng>(area: &BattleArea, rng: &mut R) -> Vec<(i32, i32)> {
    let count = rng.random_range(1..=3);
    (0..count)
        .map(|_| {
            let x = area.left + rng.random_range(0..=area.width);
            let y = area.top + rng.random_range(0..=area.height / 2);
            (x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_energy_full_indicator_wins() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(estimate_energy(true, &mut rng), 10);

        for _ in 0..100 {
            let energy = estimate_energy(false, &mut rng);
            assert!((5..=9).contains(&energy));
        }
    }

    #[test]
    fn test_gold_defaults_without_icon() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(estimate_gold(false, &mut rng), DEFAULT_GOLD);

        for _ in 0..100 {
            let gold = estimate_gold(true, &mut rng);
            assert!((30..=100).contains(&gold));
        }
    }

    #[test]
    fn test_population_never_exceeds_limit() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let (population, limit) = estimate_population(true, &mut rng);
            assert!(population <= limit);
            assert!((1..=5).contains(&population));
            assert!(limit <= 10);
        }

        assert_eq!(estimate_population(false, &mut rng), DEFAULT_POPULATION);
    }

    #[test]
    fn test_fabricated_units_stay_in_their_halves() {
        let mut rng = StdRng::seed_from_u64(3);
        let area = BattleArea::from_frame(1920, 1080);

        for _ in 0..50 {
            for (x, y) in fabricate_ally_units(&area, &mut rng) {
                assert!(area.contains(x, y));
                assert!(y >= area.top + area.height / 2);
            }
            for (x, y) in fabricate_enemy_units(&area, &mut rng) {
                assert!(area.contains(x, y));
                assert!(y <= area.top + area.height / 2);
            }
        }
    }
}
