//! Vision and image processing module
//!
//! Turns captured frames into a structured view of the game: which screen
//! is showing, where the interactive elements are, and the estimated battle
//! counters.

pub mod capture;
pub mod hud;
pub mod matcher;
pub mod template;

use image::{imageops, GrayImage, RgbaImage};
use rand::Rng;

use crate::game::board::BattleArea;
use crate::game::state::GameScreen;

pub use capture::ScreenGrabber;
pub use hud::HudReadout;
pub use matcher::TemplateMatch;
pub use template::TemplateLibrary;

/// Mean center brightness above which a frame is taken for the relic pick
/// screen (the game dims everything except the three offered relics)
const RELIC_BRIGHTNESS_THRESHOLD: f32 = 100.0;

/// A hand card slot located on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSlot {
    /// Slot number, 1-4
    pub slot: usize,
    /// Click position (center of the matched template)
    pub pos: (i32, i32),
    /// Match score
    pub score: f32,
}

/// Result of analyzing one frame
#[derive(Debug, Clone)]
pub struct BattleView {
    /// Classified screen
    pub screen: GameScreen,
    /// Frame dimensions
    pub frame_size: (u32, u32),
    /// Battle-field geometry for this frame
    pub area: BattleArea,
    /// Located hand card slots
    pub card_slots: Vec<CardSlot>,
    /// Shop card anchor points (left, middle, right of the shop row)
    pub shop_anchors: [(i32, i32); 3],
    /// Located buy-card marker
    pub buy_button: Option<(i32, i32)>,
    /// Located shop refresh button
    pub refresh_button: Option<(i32, i32)>,
    /// Located population upgrade button
    pub upgrade_button: Option<(i32, i32)>,
    /// Located duplicate-card marker
    pub merge_card: Option<(i32, i32)>,
    /// Located result confirmation button
    pub ok_button: Option<(i32, i32)>,
    /// Estimated battle counters
    pub hud: HudReadout,
    /// Fabricated ally positions
    pub ally_units: Vec<(i32, i32)>,
    /// Fabricated enemy positions
    pub enemy_units: Vec<(i32, i32)>,
}

/// Per-check confidence thresholds
#[derive(Debug, Clone, Copy)]
pub struct MatchThresholds {
    /// Default threshold
    pub base: f32,
    /// Screen classification checks
    pub state: f32,
    /// Hand card slots (lower, the art under the frame varies)
    pub card_slot: f32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            base: 0.8,
            state: 0.7,
            card_slot: 0.6,
        }
    }
}

/// Main vision system coordinating template lookups and frame analysis
pub struct VisionSystem {
    /// Loaded template images
    library: TemplateLibrary,
    /// Match confidence thresholds
    thresholds: MatchThresholds,
    /// Last classified screen
    last_screen: GameScreen,
}

impl VisionSystem {
    /// Create a vision system over a template library
    pub fn new(library: TemplateLibrary, thresholds: MatchThresholds) -> Self {
        Self {
            library,
            thresholds,
            last_screen: GameScreen::Unknown,
        }
    }

    /// Access the template library
    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// The most recent classification result
    pub fn last_screen(&self) -> GameScreen {
        self.last_screen
    }

    /// Find a named template in a grayscale frame.
    ///
    /// A template that was never loaded is a miss, not an error, matching
    /// how the tool treats missing template files.
    pub fn find(
        &self,
        gray: &GrayImage,
        name: &str,
        confidence: f32,
    ) -> Result<Option<TemplateMatch>, VisionError> {
        let Some(template) = self.library.get(name) else {
            log::warn!("template not loaded: {}", name);
            return Ok(None);
        };

        let result = matcher::find_template(gray, template, confidence)?;
        if let Some(found) = &result {
            log::debug!(
                "matched {} at ({}, {}) score {:.2}",
                name,
                found.x,
                found.y,
                found.score
            );
        }
        Ok(result)
    }

    /// Convenience: find a template and return its click point
    pub fn find_center(
        &self,
        gray: &GrayImage,
        name: &str,
        confidence: f32,
    ) -> Result<Option<(i32, i32)>, VisionError> {
        Ok(self.find(gray, name, confidence)?.map(|m| m.center()))
    }

    /// Classify which screen a frame shows.
    ///
    /// Checks run in priority order: main menu, relic pick (only while a
    /// pick is still pending), result banners, and everything else counts
    /// as in-battle.
    pub fn classify(
        &mut self,
        gray: &GrayImage,
        relic_pending: bool,
    ) -> Result<GameScreen, VisionError> {
        let state = self.thresholds.state;

        let screen = if self
            .find(gray, template::names::BATTLE_BUTTON, state)?
            .is_some()
        {
            GameScreen::MainMenu
        } else if relic_pending && is_relic_screen(gray) {
            GameScreen::RelicSelection
        } else if self
            .find(gray, template::names::VICTORY_SCREEN, state)?
            .is_some()
        {
            GameScreen::Victory
        } else if self
            .find(gray, template::names::DEFEAT_SCREEN, state)?
            .is_some()
        {
            GameScreen::Defeat
        } else {
            GameScreen::InBattle
        };

        self.last_screen = screen;
        Ok(screen)
    }

    /// Analyze a frame into a [`BattleView`].
    ///
    /// Element searches and HUD estimation only run for in-battle frames;
    /// other screens return the classification with an empty view.
    pub fn analyze<R: Rng>(
        &mut self,
        frame: &RgbaImage,
        relic_pending: bool,
        rng: &mut R,
    ) -> Result<BattleView, VisionError> {
        let gray = imageops::grayscale(frame);
        let frame_size = frame.dimensions();
        let area = BattleArea::from_frame(frame_size.0, frame_size.1);

        let screen = self.classify(&gray, relic_pending)?;

        let mut view = BattleView {
            screen,
            frame_size,
            area,
            card_slots: Vec::new(),
            shop_anchors: shop_anchors(frame_size),
            buy_button: None,
            refresh_button: None,
            upgrade_button: None,
            merge_card: None,
            ok_button: None,
            hud: HudReadout::default(),
            ally_units: Vec::new(),
            enemy_units: Vec::new(),
        };

        if screen != GameScreen::InBattle {
            if screen.is_battle_over() {
                view.ok_button =
                    self.find_center(&gray, template::names::OK_BUTTON, self.thresholds.base)?;
            }
            return Ok(view);
        }

        for slot in 1..=4 {
            let name = template::names::card_slot(slot);
            if let Some(found) = self.find(&gray, &name, self.thresholds.card_slot)? {
                view.card_slots.push(CardSlot {
                    slot,
                    pos: found.center(),
                    score: found.score,
                });
            }
        }

        let base = self.thresholds.base;
        let state = self.thresholds.state;
        view.buy_button = self.find_center(&gray, template::names::BUY_CARD, state)?;
        view.refresh_button = self.find_center(&gray, template::names::REFRESH_CARDS, state)?;
        view.upgrade_button =
            self.find_center(&gray, template::names::UPGRADE_POPULATION, state)?;
        view.merge_card = self.find_center(&gray, template::names::SAME_CARD, state)?;
        view.ok_button = self.find_center(&gray, template::names::OK_BUTTON, base)?;

        let energy_full = self
            .find(&gray, template::names::ENERGY_FULL, state)?
            .is_some();
        let coin = self.find(&gray, template::names::GOLD_COIN, state)?.is_some();
        let population = self
            .find(&gray, template::names::POPULATION, state)?
            .is_some();
        let refresh_visible = view.refresh_button.is_some();

        let (population_count, population_limit) = hud::estimate_population(population, rng);
        view.hud = HudReadout {
            energy: hud::estimate_energy(energy_full, rng),
            gold: hud::estimate_gold(coin, rng),
            refresh_cost: hud::estimate_refresh_cost(refresh_visible, rng),
            population: population_count,
            population_limit,
        };

        view.ally_units = hud::fabricate_ally_units(&area, rng);
        view.enemy_units = hud::fabricate_enemy_units(&area, rng);

        Ok(view)
    }
}

/// Shop card anchor points: thirds of the width at three quarters height
pub fn shop_anchors(frame_size: (u32, u32)) -> [(i32, i32); 3] {
    let (w, h) = (frame_size.0 as i32, frame_size.1 as i32);
    let y = h * 3 / 4;
    [(w / 4, y), (w / 2, y), (w * 3 / 4, y)]
}

/// Relic pick heuristic: the center quarter of the frame lights up while
/// the rest of the scene is dimmed
pub fn is_relic_screen(gray: &GrayImage) -> bool {
    let (w, h) = gray.dimensions();
    if w < 4 || h < 4 {
        return false;
    }

    capture::mean_brightness(gray, w / 4, h / 4, w / 2, h / 2)
        .is_some_and(|mean| mean > RELIC_BRIGHTNESS_THRESHOLD)
}

/// Candidate click points for the three offered relics
pub fn relic_candidates(frame_size: (u32, u32)) -> [(i32, i32); 3] {
    let (w, h) = (frame_size.0 as i32, frame_size.1 as i32);
    [(w / 4, h / 2), (w / 2, h / 2), (w * 3 / 4, h / 2)]
}

/// Vision errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("screen capture failed: {0}")]
    CaptureFailed(String),
    #[error("template directory not found: {0}")]
    TemplateDirMissing(String),
    #[error("failed to load templates from {0}: {1}")]
    TemplateLoad(String, String),
    #[error("template {template:?} larger than frame {frame:?}")]
    TemplateLargerThanFrame {
        template: (u32, u32),
        frame: (u32, u32),
    },
    #[error("template has zero size")]
    EmptyTemplate,
    #[error("search region {region:?} outside frame {frame:?}")]
    RegionOutOfBounds {
        region: (u32, u32, u32, u32),
        frame: (u32, u32),
    },
}
