//! Battle bookkeeping
//!
//! Holds the transient counters for an ongoing battle. The counters come
//! from the HUD estimators each poll, so they are approximations; the local
//! deductions after a purchase only keep the decision layer from spending
//! the same gold twice within one poll cycle.

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::strategy::BattleCommand;
use crate::vision::hud::HudReadout;

/// Current battle posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stance {
    /// Place units near the enemy side
    Aggressive,
    /// Place units deep in our own side
    Defensive,
}

/// State of the battle currently being played
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleState {
    /// Energy estimate, 0-10
    pub energy: u32,
    /// Gold estimate
    pub gold: u32,
    /// Current shop refresh cost estimate
    pub refresh_cost: u32,
    /// Current population estimate
    pub population: u32,
    /// Population cap estimate
    pub population_limit: u32,
    /// Current posture
    pub stance: Stance,
    /// Preferred order of hand slots to play, 1-indexed
    pub card_play_order: Vec<usize>,
    /// Commands issued this battle
    pub commands_issued: u32,
}

impl BattleState {
    /// Create the state for a fresh battle
    pub fn new(settings: &Settings) -> Self {
        Self {
            energy: 0,
            gold: 0,
            refresh_cost: settings.economy.refresh_base_cost,
            population: 0,
            population_limit: 0,
            stance: Stance::Aggressive,
            card_play_order: settings.strategy.card_play_order.clone(),
            commands_issued: 0,
        }
    }

    /// Reset for the next battle, keeping the configured play order
    pub fn reset(&mut self, settings: &Settings) {
        let order = std::mem::take(&mut self.card_play_order);
        *self = Self::new(settings);
        self.card_play_order = order;
    }

    /// Take over the latest HUD estimates
    pub fn apply_readout(&mut self, readout: &HudReadout) {
        self.energy = readout.energy;
        self.gold = readout.gold;
        self.refresh_cost = readout.refresh_cost;
        self.population = readout.population;
        self.population_limit = readout.population_limit;
    }

    /// Re-evaluate the posture from the field situation.
    ///
    /// Being outnumbered by two or more enemies forces a defensive posture;
    /// a full energy reserve switches back to attacking.
    pub fn update_stance(&mut self, allies: usize, enemies: usize, settings: &Settings) {
        if enemies > allies && enemies >= 2 {
            if self.stance != Stance::Defensive {
                log::info!("outnumbered ({} vs {}), going defensive", allies, enemies);
            }
            self.stance = Stance::Defensive;
        } else if self.energy >= settings.economy.aggressive_energy {
            if self.stance != Stance::Aggressive {
                log::info!("energy at {}, going aggressive", self.energy);
            }
            self.stance = Stance::Aggressive;
        }
    }

    /// Whether the population cap is close enough to be worth raising
    pub fn should_upgrade_population(&self) -> bool {
        self.population_limit > 0 && self.population + 1 >= self.population_limit
    }

    /// Whether a shop card is affordable and there is room for it
    pub fn can_buy_card(&self, settings: &Settings) -> bool {
        self.gold >= settings.economy.card_cost && self.population < self.population_limit
    }

    /// Whether refreshing still leaves enough gold to buy afterwards
    pub fn can_refresh(&self, _settings: &Settings) -> bool {
        self.gold >= self.refresh_cost * 2
    }

    /// Whether there is enough energy to play a card from hand
    pub fn can_play_card(&self, settings: &Settings) -> bool {
        self.energy >= settings.economy.play_energy_cost
    }

    /// Whether the turn is effectively over (no gold left to act with)
    pub fn turn_exhausted(&self, settings: &Settings) -> bool {
        self.gold < settings.economy.refresh_base_cost
    }

    /// Apply the local cost of an issued command
    pub fn record_command(&mut self, command: &BattleCommand, settings: &Settings) {
        match command {
            BattleCommand::BuyCard { .. } => {
                self.gold = self.gold.saturating_sub(settings.economy.card_cost);
            }
            BattleCommand::RefreshShop { .. } => {
                self.gold = self.gold.saturating_sub(self.refresh_cost);
            }
            BattleCommand::UpgradePopulation { .. } => {
                self.gold = self.gold.saturating_sub(settings.economy.upgrade_cost);
                self.population_limit += 1;
            }
            BattleCommand::PlayCard { .. }
            | BattleCommand::MergeCards { .. }
            | BattleCommand::Idle { .. } => {}
        }
        self.commands_issued += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(gold: u32, energy: u32, population: u32, limit: u32) -> BattleState {
        let settings = Settings::default();
        let mut state = BattleState::new(&settings);
        state.apply_readout(&HudReadout {
            energy,
            gold,
            refresh_cost: 2,
            population,
            population_limit: limit,
        });
        state
    }

    #[test]
    fn test_affordability() {
        let settings = Settings::default();

        let state = state_with(10, 5, 3, 6);
        assert!(state.can_buy_card(&settings));
        assert!(state.can_refresh(&settings));
        assert!(state.can_play_card(&settings));

        let broke = state_with(1, 2, 3, 6);
        assert!(!broke.can_buy_card(&settings));
        assert!(!broke.can_refresh(&settings));
        assert!(!broke.can_play_card(&settings));
        assert!(broke.turn_exhausted(&settings));
    }

    #[test]
    fn test_upgrade_trigger_near_cap() {
        assert!(state_with(10, 5, 5, 6).should_upgrade_population());
        assert!(state_with(10, 5, 6, 6).should_upgrade_population());
        assert!(!state_with(10, 5, 3, 6).should_upgrade_population());
        // Unknown cap means no upgrade pressure
        assert!(!state_with(10, 5, 0, 0).should_upgrade_population());
    }

    #[test]
    fn test_stance_switching() {
        let settings = Settings::default();
        let mut state = state_with(10, 9, 3, 6);

        state.update_stance(1, 3, &settings);
        assert_eq!(state.stance, Stance::Defensive);

        // Not outnumbered and energy is high: back to aggressive
        state.update_stance(3, 2, &settings);
        assert_eq!(state.stance, Stance::Aggressive);

        // Low energy and even field: posture stays put
        state.energy = 4;
        state.stance = Stance::Defensive;
        state.update_stance(2, 2, &settings);
        assert_eq!(state.stance, Stance::Defensive);
    }

    #[test]
    fn test_command_costs() {
        let settings = Settings::default();
        let mut state = state_with(20, 5, 3, 6);

        state.record_command(
            &BattleCommand::BuyCard { at: (0, 0) },
            &settings,
        );
        assert_eq!(state.gold, 20 - settings.economy.card_cost);

        state.record_command(
            &BattleCommand::RefreshShop { at: (0, 0) },
            &settings,
        );
        assert_eq!(state.gold, 20 - settings.economy.card_cost - state.refresh_cost);

        let gold_before = state.gold;
        state.record_command(
            &BattleCommand::UpgradePopulation { at: (0, 0) },
            &settings,
        );
        assert_eq!(state.gold, gold_before.saturating_sub(settings.economy.upgrade_cost));
        assert_eq!(state.population_limit, 7);
        assert_eq!(state.commands_issued, 3);
    }
}
