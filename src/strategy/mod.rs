//! Battle decision engine
//!
//! Picks exactly one command per poll from the current view of the battle,
//! walking the priority ladder the bot has always used: merge duplicates,
//! raise the population cap, shop (buy, then refresh), then play a card.

pub mod placement;
pub mod search;

use rand::Rng;

use crate::config::Settings;
use crate::game::battle::BattleState;
use crate::vision::BattleView;

pub use placement::select_target;
pub use search::{SearchPattern, SpiralSchedule, SweepDirection};

/// One decision for the current poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleCommand {
    /// Click a duplicate card to merge it up a star
    MergeCards { at: (i32, i32) },
    /// Click the population upgrade button
    UpgradePopulation { at: (i32, i32) },
    /// Click a shop card to buy it
    BuyCard { at: (i32, i32) },
    /// Click the shop refresh button
    RefreshShop { at: (i32, i32) },
    /// Click a hand slot, then click its placement target
    PlayCard {
        slot: usize,
        card: (i32, i32),
        target: (i32, i32),
    },
    /// Nothing worth doing this poll
    Idle { wait_ms: u32 },
}

/// The decision engine.
///
/// Stateless; everything it needs arrives in the view and battle state, and
/// the RNG carries the probabilistic parts so tests can seed them.
pub struct BattleBrain;

impl BattleBrain {
    /// Create a new decision engine
    pub fn new() -> Self {
        Self
    }

    /// Decide the next command for the current poll
    pub fn decide<R: Rng>(
        &self,
        view: &BattleView,
        battle: &BattleState,
        settings: &Settings,
        rng: &mut R,
    ) -> BattleCommand {
        let chances = &settings.strategy;

        // Duplicates merge for free, so take the chance when one shows up
        if let Some(at) = view.merge_card {
            if rng.random_bool(chances.merge_chance) {
                log::info!("merging duplicate card at ({}, {})", at.0, at.1);
                return BattleCommand::MergeCards { at };
            }
        }

        if battle.should_upgrade_population() {
            if let Some(at) = view.upgrade_button {
                log::info!(
                    "population {}/{} near cap, upgrading",
                    battle.population,
                    battle.population_limit
                );
                return BattleCommand::UpgradePopulation { at };
            }
        }

        if battle.can_buy_card(settings) && rng.random_bool(chances.buy_chance) {
            // Marked shop card if one matched, otherwise a random shop anchor
            let at = view
                .buy_button
                .unwrap_or_else(|| view.shop_anchors[rng.random_range(0..view.shop_anchors.len())]);
            log::info!("buying card at ({}, {})", at.0, at.1);
            return BattleCommand::BuyCard { at };
        }

        if battle.can_refresh(settings) && rng.random_bool(chances.refresh_chance) {
            if let Some(at) = view.refresh_button {
                log::info!("refreshing shop for ~{} gold", battle.refresh_cost);
                return BattleCommand::RefreshShop { at };
            }
        }

        if battle.can_play_card(settings) {
            if let Some(card) = first_playable(&battle.card_play_order, view) {
                let target = placement::select_target(view, battle.stance, settings, rng);
                log::info!(
                    "playing slot {} to ({}, {})",
                    card.slot,
                    target.0,
                    target.1
                );
                return BattleCommand::PlayCard {
                    slot: card.slot,
                    card: card.pos,
                    target,
                };
            }
            log::debug!("energy available but no hand slot located");
        }

        if battle.turn_exhausted(settings) {
            log::info!("out of gold, waiting out the turn");
        }
        BattleCommand::Idle {
            wait_ms: settings.timings.idle_wait_ms,
        }
    }
}

impl Default for BattleBrain {
    fn default() -> Self {
        Self::new()
    }
}

/// The first located hand slot in the configured play order
fn first_playable<'a>(
    play_order: &[usize],
    view: &'a BattleView,
) -> Option<&'a crate::vision::CardSlot> {
    play_order
        .iter()
        .find_map(|&slot| view.card_slots.iter().find(|c| c.slot == slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::BattleArea;
    use crate::game::state::GameScreen;
    use crate::vision::hud::HudReadout;
    use crate::vision::CardSlot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn view_with(hud: HudReadout) -> BattleView {
        BattleView {
            screen: GameScreen::InBattle,
            frame_size: (1920, 1080),
            area: BattleArea::from_frame(1920, 1080),
            card_slots: vec![
                CardSlot {
                    slot: 1,
                    pos: (200, 950),
                    score: 0.9,
                },
                CardSlot {
                    slot: 3,
                    pos: (500, 950),
                    score: 0.8,
                },
            ],
            shop_anchors: [(480, 810), (960, 810), (1440, 810)],
            buy_button: Some((900, 800)),
            refresh_button: Some((1600, 800)),
            upgrade_button: Some((300, 900)),
            merge_card: None,
            ok_button: None,
            hud,
            ally_units: vec![(800, 700)],
            enemy_units: vec![(700, 300)],
        }
    }

    fn battle_with(view: &BattleView) -> BattleState {
        let settings = Settings::default();
        let mut battle = BattleState::new(&settings);
        battle.apply_readout(&view.hud);
        battle
    }

    #[test]
    fn test_upgrade_takes_priority_over_shopping() {
        let settings = Settings::default();
        let view = view_with(HudReadout {
            energy: 9,
            gold: 50,
            refresh_cost: 2,
            population: 5,
            population_limit: 6,
        });
        let battle = battle_with(&view);
        let brain = BattleBrain::new();

        // Regardless of the merge/buy rolls the upgrade must win whenever
        // the merge branch is not taken (no duplicate on screen here).
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let command = brain.decide(&view, &battle, &settings, &mut rng);
            assert_eq!(
                command,
                BattleCommand::UpgradePopulation { at: (300, 900) }
            );
        }
    }

    #[test]
    fn test_merge_fires_only_with_duplicate_on_screen() {
        let settings = Settings::default();
        let mut view = view_with(HudReadout {
            energy: 5,
            gold: 50,
            refresh_cost: 2,
            population: 2,
            population_limit: 6,
        });
        view.merge_card = Some((640, 820));
        let battle = battle_with(&view);
        let brain = BattleBrain::new();

        let mut merged = 0;
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            if let BattleCommand::MergeCards { at } =
                brain.decide(&view, &battle, &settings, &mut rng)
            {
                assert_eq!(at, (640, 820));
                merged += 1;
            }
        }
        // Roughly the configured 30% of polls should merge
        assert!(merged > 20 && merged < 120, "merged {} times", merged);
    }

    #[test]
    fn test_plays_first_slot_in_configured_order() {
        let mut settings = Settings::default();
        // Make the probabilistic shop branches impossible
        settings.strategy.merge_chance = 0.0;
        settings.strategy.buy_chance = 0.0;
        settings.strategy.refresh_chance = 0.0;

        let view = view_with(HudReadout {
            energy: 9,
            gold: 50,
            refresh_cost: 2,
            population: 2,
            population_limit: 6,
        });
        let battle = battle_with(&view);
        let brain = BattleBrain::new();

        let mut rng = StdRng::seed_from_u64(1);
        match brain.decide(&view, &battle, &settings, &mut rng) {
            BattleCommand::PlayCard { slot, card, .. } => {
                // Order is [1, 2, 3, 4] and slot 1 is on screen
                assert_eq!(slot, 1);
                assert_eq!(card, (200, 950));
            }
            other => panic!("expected PlayCard, got {:?}", other),
        }
    }

    #[test]
    fn test_idles_when_broke_and_out_of_energy() {
        let mut settings = Settings::default();
        settings.strategy.merge_chance = 0.0;
        settings.strategy.buy_chance = 1.0;
        settings.strategy.refresh_chance = 1.0;

        let view = view_with(HudReadout {
            energy: 2,
            gold: 1,
            refresh_cost: 2,
            population: 2,
            population_limit: 6,
        });
        let battle = battle_with(&view);
        let brain = BattleBrain::new();

        let mut rng = StdRng::seed_from_u64(1);
        let command = brain.decide(&view, &battle, &settings, &mut rng);
        assert_eq!(
            command,
            BattleCommand::Idle {
                wait_ms: settings.timings.idle_wait_ms
            }
        );
    }

    #[test]
    fn test_buy_falls_back_to_shop_anchor() {
        let mut settings = Settings::default();
        settings.strategy.merge_chance = 0.0;
        settings.strategy.buy_chance = 1.0;

        let mut view = view_with(HudReadout {
            energy: 5,
            gold: 50,
            refresh_cost: 2,
            population: 2,
            population_limit: 6,
        });
        view.buy_button = None;
        let battle = battle_with(&view);
        let brain = BattleBrain::new();

        let mut rng = StdRng::seed_from_u64(9);
        match brain.decide(&view, &battle, &settings, &mut rng) {
            BattleCommand::BuyCard { at } => {
                assert!(view.shop_anchors.contains(&at));
            }
            other => panic!("expected BuyCard, got {:?}", other),
        }
    }
}
