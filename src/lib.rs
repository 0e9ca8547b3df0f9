//! Spiritbot - screen-scraping battle automation for the Battle Spirit card game
//!
//! This library provides the core functionality for automating Battle Spirit
//! matches: screenshot analysis, template matching, battle decision-making,
//! and synthetic mouse input generation.
//!
//! ## Anti-Detection
//!
//! The `stealth` module provides humanization features to make automation
//! less detectable by adding realistic variance to timing and click positions.

pub mod config;
pub mod game;
pub mod input;
pub mod runner;
pub mod stealth;
pub mod strategy;
pub mod vision;

use image::RgbaImage;
use rand::Rng;

use crate::config::Settings;
use crate::game::battle::BattleState;
use crate::game::state::{BotState, GameScreen};
use crate::input::actions;
use crate::stealth::Humanizer;
use crate::strategy::BattleBrain;
use crate::vision::VisionSystem;

/// Core bot: vision, decision engine, and game bookkeeping.
///
/// The bot itself never touches the mouse or the screen; it turns frames
/// into [`BotAction`] sequences which the runner executes.
pub struct SpiritBot {
    pub vision: VisionSystem,
    pub brain: BattleBrain,
    pub state: BotState,
    pub battle: BattleState,
    pub settings: Settings,
}

impl SpiritBot {
    /// Create a new bot with the given vision system and settings
    pub fn new(vision: VisionSystem, settings: Settings) -> Self {
        Self {
            vision,
            brain: BattleBrain::new(),
            state: BotState::new(),
            battle: BattleState::new(&settings),
            settings,
        }
    }

    /// Process one captured frame and return the actions to perform.
    ///
    /// Classifies the screen, updates the tracked game state, and while a
    /// battle is running asks the decision engine for exactly one command
    /// per poll, translated into clicks and waits.
    pub fn process_frame<R: Rng>(
        &mut self,
        frame: &RgbaImage,
        humanizer: &mut Humanizer,
        rng: &mut R,
    ) -> Vec<BotAction> {
        let view = match self.vision.analyze(frame, !self.state.relic_selected, rng) {
            Ok(view) => view,
            Err(e) => {
                log::error!("failed to analyze frame: {}", e);
                return Vec::new();
            }
        };

        self.state.update_screen(view.screen);

        if view.screen != GameScreen::InBattle || !self.state.in_battle {
            return Vec::new();
        }

        self.battle.apply_readout(&view.hud);
        self.battle
            .update_stance(view.ally_units.len(), view.enemy_units.len(), &self.settings);

        let command = self.brain.decide(&view, &self.battle, &self.settings, rng);
        self.battle.record_command(&command, &self.settings);

        actions::build(&command, &self.settings, humanizer)
    }
}

/// A single synthetic input step produced by the decision layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    /// No action needed
    None,
    /// Click at a specific screen coordinate
    Click { x: i32, y: i32 },
    /// Press, move, and release to drag the map
    Drag {
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        duration_ms: u32,
    },
    /// Sleep for a specified duration
    Wait { duration_ms: u32 },
}
