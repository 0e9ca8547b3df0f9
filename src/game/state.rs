//! Game state tracking
//!
//! Tracks which screen the game is on, the battle flags, and the running
//! tallies across an automation session.

use serde::{Deserialize, Serialize};

/// Which screen the game is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameScreen {
    /// Could not classify the frame
    Unknown,
    /// Main menu with the battle button visible
    MainMenu,
    /// Relic pick between battles
    RelicSelection,
    /// A battle is running
    InBattle,
    /// Victory banner
    Victory,
    /// Defeat banner
    Defeat,
}

impl GameScreen {
    /// Check if this screen ends a battle
    pub fn is_battle_over(&self) -> bool {
        matches!(self, GameScreen::Victory | GameScreen::Defeat)
    }

    /// Check if the bot is expected to act on this screen
    pub fn requires_input(&self) -> bool {
        matches!(
            self,
            GameScreen::MainMenu
                | GameScreen::RelicSelection
                | GameScreen::InBattle
                | GameScreen::Victory
                | GameScreen::Defeat
        )
    }
}

/// Outcome of a finished battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    /// Neither banner appeared before the result timeout
    Timeout,
}

/// Overall bot state across a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotState {
    /// Current screen
    pub screen: GameScreen,
    /// Previous screen (for transition detection)
    pub previous_screen: GameScreen,
    /// Number of consecutive polls spent on the current screen
    pub polls_in_screen: u32,
    /// Whether a battle is considered running
    pub in_battle: bool,
    /// Whether a relic has been picked for the current battle
    pub relic_selected: bool,
    /// Battles finished this session
    pub battles_completed: u32,
    /// Victories this session
    pub victories: u32,
    /// Defeats this session
    pub defeats: u32,
    /// Battles that timed out without a result banner
    pub timeouts: u32,
}

impl Default for BotState {
    fn default() -> Self {
        Self {
            screen: GameScreen::Unknown,
            previous_screen: GameScreen::Unknown,
            polls_in_screen: 0,
            in_battle: false,
            relic_selected: false,
            battles_completed: 0,
            victories: 0,
            defeats: 0,
            timeouts: 0,
        }
    }
}

impl BotState {
    /// Create a fresh bot state
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the tracked screen from a classification result
    pub fn update_screen(&mut self, new_screen: GameScreen) {
        if new_screen != self.screen {
            self.previous_screen = self.screen;
            self.screen = new_screen;
            self.polls_in_screen = 0;
            self.on_transition(self.previous_screen, new_screen);
        } else {
            self.polls_in_screen += 1;
        }
    }

    /// Handle screen transitions
    fn on_transition(&mut self, from: GameScreen, to: GameScreen) {
        match (from, to) {
            (_, GameScreen::InBattle) => {
                self.in_battle = true;
            }
            (GameScreen::InBattle, GameScreen::MainMenu) => {
                // Fell out of a battle without a result banner
                self.in_battle = false;
            }
            _ => {}
        }
    }

    /// Record a finished battle and reset the per-battle flags
    pub fn record_outcome(&mut self, outcome: BattleOutcome) {
        self.battles_completed += 1;
        match outcome {
            BattleOutcome::Victory => self.victories += 1,
            BattleOutcome::Defeat => self.defeats += 1,
            BattleOutcome::Timeout => self.timeouts += 1,
        }
        self.in_battle = false;
        self.relic_selected = false;
    }

    /// Win rate over the finished battles, 0.0 when none finished
    pub fn win_rate(&self) -> f32 {
        if self.battles_completed == 0 {
            return 0.0;
        }
        self.victories as f32 / self.battles_completed as f32
    }

    /// Check if the game seems stuck (many polls on an actionable screen)
    pub fn is_stuck(&self, threshold: u32) -> bool {
        self.polls_in_screen > threshold && self.screen.requires_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_transitions() {
        let mut state = BotState::new();

        state.update_screen(GameScreen::MainMenu);
        assert_eq!(state.screen, GameScreen::MainMenu);
        assert_eq!(state.polls_in_screen, 0);

        state.update_screen(GameScreen::MainMenu);
        assert_eq!(state.polls_in_screen, 1);

        state.update_screen(GameScreen::InBattle);
        assert!(state.in_battle);
        assert_eq!(state.previous_screen, GameScreen::MainMenu);
    }

    #[test]
    fn test_outcome_tallies() {
        let mut state = BotState::new();
        state.in_battle = true;
        state.relic_selected = true;

        state.record_outcome(BattleOutcome::Victory);
        state.record_outcome(BattleOutcome::Defeat);
        state.record_outcome(BattleOutcome::Victory);

        assert_eq!(state.battles_completed, 3);
        assert_eq!(state.victories, 2);
        assert_eq!(state.defeats, 1);
        assert!((state.win_rate() - 2.0 / 3.0).abs() < f32::EPSILON);
        assert!(!state.in_battle);
        assert!(!state.relic_selected);
    }

    #[test]
    fn test_stuck_detection() {
        let mut state = BotState::new();
        state.update_screen(GameScreen::MainMenu);
        for _ in 0..10 {
            state.update_screen(GameScreen::MainMenu);
        }

        assert!(state.is_stuck(5));
        assert!(!state.is_stuck(20));
    }

    #[test]
    fn test_battle_over_screens() {
        assert!(GameScreen::Victory.is_battle_over());
        assert!(GameScreen::Defeat.is_battle_over());
        assert!(!GameScreen::InBattle.is_battle_over());
    }
}
