//! Placement target selection
//!
//! Where to drop a played card: usually near an enemy unit, otherwise at a
//! lane anchor matching the current posture, with plain fallbacks when the
//! field is empty.

use rand::Rng;

use crate::config::Settings;
use crate::game::battle::Stance;
use crate::vision::BattleView;

/// Jitter applied around an enemy unit's position, in pixels each axis
const NEAR_ENEMY_JITTER: i32 = 30;

/// Pick a placement target for a card about to be played
pub fn select_target<R: Rng>(
    view: &BattleView,
    stance: Stance,
    settings: &Settings,
    rng: &mut R,
) -> (i32, i32) {
    // Dropping next to an enemy contests it immediately
    if !view.enemy_units.is_empty()
        && rng.random_bool(settings.strategy.near_enemy_chance)
    {
        let (ex, ey) = view.enemy_units[rng.random_range(0..view.enemy_units.len())];
        return (
            ex + rng.random_range(-NEAR_ENEMY_JITTER..=NEAR_ENEMY_JITTER),
            ey + rng.random_range(-NEAR_ENEMY_JITTER..=NEAR_ENEMY_JITTER),
        );
    }

    if view.area.width > 0 && view.area.height > 0 {
        let anchors = match stance {
            Stance::Aggressive => view.area.offense_anchors(),
            Stance::Defensive => view.area.defense_anchors(),
        };
        return anchors[rng.random_range(0..anchors.len())];
    }

    // Degenerate frame; aim for its middle
    (
        view.frame_size.0 as i32 / 2,
        view.frame_size.1 as i32 / 2,
    )
}
