//! User settings
//!
//! Every tunable the bot exposes: matching confidences, the game's economy
//! constants, decision probabilities, screen timings, and run parameters.
//! Settings round-trip through JSON so a profile can live next to the
//! template directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::stealth::StealthConfig;

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Screen capture options
    pub capture: CaptureSettings,
    /// Template match confidences
    pub matching: MatchSettings,
    /// Game economy constants
    pub economy: EconomySettings,
    /// Decision probabilities and ordering
    pub strategy: StrategySettings,
    /// Screen interaction timings
    pub timings: TimingSettings,
    /// Battle loop parameters
    pub run: RunSettings,
    /// Anti-detection options
    pub stealth: StealthConfig,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Preset that pushes units forward and shops eagerly
    pub fn aggressive_preset() -> Self {
        Self {
            strategy: StrategySettings {
                buy_chance: 0.6,
                refresh_chance: 0.35,
                near_enemy_chance: 0.85,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Preset that holds the line and saves gold
    pub fn defensive_preset() -> Self {
        Self {
            strategy: StrategySettings {
                buy_chance: 0.3,
                refresh_chance: 0.15,
                near_enemy_chance: 0.4,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Screen capture options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Capture region (left, top, width, height); full screen when absent
    pub region: Option<(u32, u32, u32, u32)>,
}

/// Template match confidences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Default confidence threshold
    pub confidence: f32,
    /// Threshold for screen classification checks
    pub state_confidence: f32,
    /// Threshold for hand card slots (lower, the card art varies)
    pub card_slot_confidence: f32,
    /// Threshold for troop markers during map sweeps
    pub troop_confidence: f32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            confidence: 0.8,
            state_confidence: 0.7,
            card_slot_confidence: 0.6,
            troop_confidence: 0.7,
        }
    }
}

/// Game economy constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomySettings {
    /// Gold cost of a shop card
    pub card_cost: u32,
    /// Base gold cost of a shop refresh
    pub refresh_base_cost: u32,
    /// Gold cost of a population upgrade
    pub upgrade_cost: u32,
    /// Energy needed to play a card from hand
    pub play_energy_cost: u32,
    /// Energy level that flips the posture to aggressive
    pub aggressive_energy: u32,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            card_cost: 3,
            refresh_base_cost: 2,
            upgrade_cost: 5,
            play_energy_cost: 4,
            aggressive_energy: 8,
        }
    }
}

/// Decision probabilities and card ordering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySettings {
    /// Chance per poll to merge a visible duplicate
    pub merge_chance: f64,
    /// Chance per poll to buy when affordable
    pub buy_chance: f64,
    /// Chance per poll to refresh when affordable
    pub refresh_chance: f64,
    /// Chance to place a played card next to an enemy unit
    pub near_enemy_chance: f64,
    /// Preferred order of hand slots to play, 1-indexed
    pub card_play_order: Vec<usize>,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            merge_chance: 0.3,
            buy_chance: 0.4,
            refresh_chance: 0.25,
            near_enemy_chance: 0.7,
            card_play_order: vec![1, 2, 3, 4],
        }
    }
}

/// Timing settings for screen interactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Pause between the two clicks of a card play (ms)
    pub tap_pause_ms: u32,
    /// Wait for the confirm button after clicking battle (ms)
    pub confirm_wait_ms: u32,
    /// Wait for the battle scene to load (ms)
    pub battle_load_wait_ms: u32,
    /// Wait after picking a relic (ms)
    pub relic_pick_wait_ms: u32,
    /// Wait for the battle to start after the relic pick (ms)
    pub relic_enter_wait_ms: u32,
    /// Wait for shop animations to settle (ms)
    pub purchase_settle_ms: u32,
    /// Wait when there is nothing to do this poll (ms)
    pub idle_wait_ms: u32,
    /// Interval between battle polls (ms)
    pub poll_interval_ms: u32,
    /// Interval between result checks (ms)
    pub result_poll_ms: u32,
    /// Wait for the result screen to finish animating before confirming (ms)
    pub result_settle_ms: u32,
    /// How long to wait for a result banner (s)
    pub result_timeout_secs: u64,
    /// Hard cap on one battle's duration (s)
    pub max_battle_secs: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            tap_pause_ms: 500,
            confirm_wait_ms: 1000,
            battle_load_wait_ms: 5000,
            relic_pick_wait_ms: 2000,
            relic_enter_wait_ms: 3000,
            purchase_settle_ms: 1000,
            idle_wait_ms: 500,
            poll_interval_ms: 2000,
            result_poll_ms: 1000,
            result_settle_ms: 2000,
            result_timeout_secs: 30,
            max_battle_secs: 180,
        }
    }
}

/// Battle loop parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// Battles to run per session
    pub num_battles: u32,
    /// Pause between battles (s)
    pub wait_between_secs: u64,
    /// Seconds to give the user to focus the game window
    pub start_delay_secs: u64,
    /// Drag iterations before a map sweep gives up
    pub max_search_iterations: u32,
    /// Map drag distance per sweep step (px)
    pub drag_distance: i32,
    /// Map drag duration (ms)
    pub drag_duration_ms: u32,
    /// Wait for the map to settle after a drag (ms)
    pub search_settle_ms: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            num_battles: 5,
            wait_between_secs: 5,
            start_delay_secs: 5,
            max_search_iterations: 50,
            drag_distance: 300,
            drag_duration_ms: 500,
            search_settle_ms: 1000,
        }
    }
}

/// Settings load/save errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
