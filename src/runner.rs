//! Battle loop runner
//!
//! The screenshot → match → click → sleep cycle. Owns the screen grabber,
//! the mouse, and the bot, and walks them through whole battles: start a
//! match, pick a relic when offered, poll and act until a result banner
//! shows, confirm it, repeat.
//!
//! In-battle failures follow the log-and-return-false convention; only
//! setup problems (missing template directory, capture or input backend
//! failures) surface as errors.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use image::{imageops, GrayImage};
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::Settings;
use crate::game::state::{BattleOutcome, BotState, GameScreen};
use crate::input::{InputError, MouseController};
use crate::stealth::Humanizer;
use crate::strategy::SearchPattern;
use crate::vision::template::names;
use crate::vision::{
    self, MatchThresholds, ScreenGrabber, TemplateLibrary, VisionError, VisionSystem,
};
use crate::SpiritBot;

/// Polls on one screen before the runner flags the game as stuck
const STUCK_POLL_THRESHOLD: u32 = 10;

/// Runner errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Tally of a finished battle session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub battles: u32,
    pub victories: u32,
    pub defeats: u32,
    pub timeouts: u32,
}

impl LoopSummary {
    fn from_state(state: &BotState) -> Self {
        Self {
            battles: state.battles_completed,
            victories: state.victories,
            defeats: state.defeats,
            timeouts: state.timeouts,
        }
    }
}

/// Drives whole battles through the screen
pub struct BattleRunner {
    grabber: ScreenGrabber,
    bot: SpiritBot,
    mouse: MouseController,
    humanizer: Humanizer,
    rng: ThreadRng,
    settings: Settings,
}

impl BattleRunner {
    /// Set up capture, templates, and input from the settings
    pub fn new(settings: Settings, templates_dir: &Path) -> Result<Self, RunnerError> {
        let library = TemplateLibrary::load_dir(templates_dir)?;
        library.warn_missing();

        let thresholds = MatchThresholds {
            base: settings.matching.confidence,
            state: settings.matching.state_confidence,
            card_slot: settings.matching.card_slot_confidence,
        };
        let vision = VisionSystem::new(library, thresholds);

        let mut grabber = ScreenGrabber::new();
        if let Some(region) = settings.capture.region {
            grabber = grabber.with_region(region);
        }

        let mouse = MouseController::new(settings.stealth.clone())?;

        Ok(Self {
            grabber,
            bot: SpiritBot::new(vision, settings.clone()),
            mouse,
            humanizer: Humanizer::new(),
            rng: rand::rng(),
            settings,
        })
    }

    /// Access the bot (for inspection after a run)
    pub fn bot(&self) -> &SpiritBot {
        &self.bot
    }

    /// Run the configured number of battles and return the tally
    pub fn run_battles(&mut self) -> Result<LoopSummary, RunnerError> {
        let num_battles = self.settings.run.num_battles;
        let wait_between = Duration::from_secs(self.settings.run.wait_between_secs);

        log::info!("starting battle loop, {} battles planned", num_battles);
        self.start_grace_period();

        while self.bot.state.battles_completed < num_battles {
            let battle_number = self.bot.state.battles_completed + 1;
            log::info!("===== battle {} of {} =====", battle_number, num_battles);

            if !self.start_battle()? {
                log::warn!("could not start a battle, retrying after a pause");
                thread::sleep(wait_between);
                continue;
            }

            self.fight()?;

            let outcome = self.handle_battle_result()?;
            log::info!("battle {} ended: {:?}", battle_number, outcome);
            self.bot.state.record_outcome(outcome);
            let settings = self.settings.clone();
            self.bot.battle.reset(&settings);

            if self.bot.state.battles_completed < num_battles {
                if self
                    .humanizer
                    .should_take_break(self.bot.state.battles_completed)
                {
                    let pause = self.humanizer.break_duration();
                    log::info!("taking a short break ({} ms)", pause);
                    thread::sleep(Duration::from_millis(pause));
                }
                log::info!(
                    "waiting {} s before the next battle",
                    self.settings.run.wait_between_secs
                );
                thread::sleep(wait_between);
            }
        }

        let summary = LoopSummary::from_state(&self.bot.state);
        log::info!(
            "battle loop finished: {} battles, {} victories, {} defeats, {} timeouts ({:.1}% win rate)",
            summary.battles,
            summary.victories,
            summary.defeats,
            summary.timeouts,
            self.bot.state.win_rate() * 100.0
        );
        Ok(summary)
    }

    /// Get the game into a running battle.
    ///
    /// Returns false when the current screen cannot lead into one.
    pub fn start_battle(&mut self) -> Result<bool, RunnerError> {
        let frame = self.grabber.capture()?;
        let gray = imageops::grayscale(&frame);
        let screen = self
            .bot
            .vision
            .classify(&gray, !self.bot.state.relic_selected)?;
        let state_confidence = self.settings.matching.state_confidence;

        match screen {
            GameScreen::MainMenu => {
                if !self.click_found(&gray, names::BATTLE_BUTTON, state_confidence)? {
                    log::warn!("battle button not found on the main menu");
                    return Ok(false);
                }

                let confirm = self.wait_for_template(
                    names::CONFIRM_BATTLE,
                    Duration::from_millis(
                        u64::from(self.settings.timings.confirm_wait_ms) * 5,
                    ),
                    Duration::from_millis(u64::from(self.settings.timings.confirm_wait_ms)),
                    state_confidence,
                )?;
                let Some(confirm) = confirm else {
                    log::warn!("confirm button never appeared");
                    return Ok(false);
                };
                self.click_at(confirm)?;

                log::info!("waiting for the battle to load...");
                thread::sleep(Duration::from_millis(
                    u64::from(self.settings.timings.battle_load_wait_ms),
                ));

                let frame = self.grabber.capture()?;
                let gray = imageops::grayscale(&frame);
                if !self.bot.state.relic_selected && vision::is_relic_screen(&gray) {
                    log::info!("relic selection detected");
                    self.select_relic(frame.dimensions())?;
                    thread::sleep(Duration::from_millis(
                        u64::from(self.settings.timings.relic_enter_wait_ms),
                    ));
                }

                self.bot.state.in_battle = true;
                Ok(true)
            }
            GameScreen::RelicSelection => {
                self.select_relic(frame.dimensions())?;
                thread::sleep(Duration::from_millis(
                    u64::from(self.settings.timings.relic_enter_wait_ms),
                ));
                self.bot.state.in_battle = true;
                Ok(true)
            }
            GameScreen::InBattle => {
                log::info!("already in a battle");
                self.bot.state.in_battle = true;
                Ok(true)
            }
            other => {
                log::warn!("screen {:?} is no place to start a battle from", other);
                Ok(false)
            }
        }
    }

    /// Pick one of the three offered relics at random
    fn select_relic(&mut self, frame_size: (u32, u32)) -> Result<(), RunnerError> {
        let candidates = vision::relic_candidates(frame_size);
        let pick = candidates[self.rng.random_range(0..candidates.len())];
        log::info!("picking relic at ({}, {})", pick.0, pick.1);

        self.click_at(pick)?;
        self.bot.state.relic_selected = true;
        thread::sleep(Duration::from_millis(
            u64::from(self.settings.timings.relic_pick_wait_ms),
        ));
        Ok(())
    }

    /// Poll and act until the battle ends or times out
    fn fight(&mut self) -> Result<(), RunnerError> {
        let deadline = Instant::now() + Duration::from_secs(self.settings.timings.max_battle_secs);
        let poll = Duration::from_millis(u64::from(self.settings.timings.poll_interval_ms));

        while Instant::now() < deadline {
            let frame = self.grabber.capture()?;
            let actions = self
                .bot
                .process_frame(&frame, &mut self.humanizer, &mut self.rng);

            if self.bot.state.screen.is_battle_over() {
                break;
            }
            if self.bot.state.is_stuck(STUCK_POLL_THRESHOLD) {
                log::warn!(
                    "{:?} for {} polls, game may be stuck",
                    self.bot.state.screen,
                    self.bot.state.polls_in_screen
                );
            }

            self.mouse.execute(&actions, &mut self.humanizer)?;
            thread::sleep(poll);
        }

        if Instant::now() >= deadline {
            log::warn!(
                "battle exceeded {} s, moving on to result handling",
                self.settings.timings.max_battle_secs
            );
        }
        Ok(())
    }

    /// Wait for a result banner and confirm it
    fn handle_battle_result(&mut self) -> Result<BattleOutcome, RunnerError> {
        let deadline =
            Instant::now() + Duration::from_secs(self.settings.timings.result_timeout_secs);
        let poll = Duration::from_millis(u64::from(self.settings.timings.result_poll_ms));
        let state_confidence = self.settings.matching.state_confidence;

        let outcome = loop {
            let frame = self.grabber.capture()?;
            let gray = imageops::grayscale(&frame);

            if self
                .bot
                .vision
                .find(&gray, names::VICTORY_SCREEN, state_confidence)?
                .is_some()
            {
                log::info!("victory!");
                break BattleOutcome::Victory;
            }
            if self
                .bot
                .vision
                .find(&gray, names::DEFEAT_SCREEN, state_confidence)?
                .is_some()
            {
                log::info!("defeat");
                break BattleOutcome::Defeat;
            }

            if Instant::now() >= deadline {
                log::warn!("timed out waiting for a result banner");
                return Ok(BattleOutcome::Timeout);
            }
            thread::sleep(poll);
        };

        // Let the result animation finish before confirming
        thread::sleep(Duration::from_millis(
            u64::from(self.settings.timings.result_settle_ms),
        ));

        let frame = self.grabber.capture()?;
        let gray = imageops::grayscale(&frame);
        if !self.click_found(&gray, names::OK_BUTTON, self.settings.matching.confidence)? {
            log::warn!("no OK button found, clicking the screen center instead");
            let (w, h) = frame.dimensions();
            self.click_at((w as i32 / 2, h as i32 / 2))?;
        }

        Ok(outcome)
    }

    /// Poll the screen until a template shows up or the wait runs out
    pub fn wait_for_template(
        &mut self,
        name: &str,
        max_wait: Duration,
        interval: Duration,
        confidence: f32,
    ) -> Result<Option<(i32, i32)>, RunnerError> {
        log::debug!("waiting up to {:?} for {}", max_wait, name);
        let deadline = Instant::now() + max_wait;

        loop {
            let frame = self.grabber.capture()?;
            let gray = imageops::grayscale(&frame);
            if let Some(pos) = self.bot.vision.find_center(&gray, name, confidence)? {
                return Ok(Some(pos));
            }
            if Instant::now() >= deadline {
                log::warn!("timed out waiting for {}", name);
                return Ok(None);
            }
            thread::sleep(interval);
        }
    }

    /// Sweep the map for troop markers of the given levels.
    ///
    /// Drags the view along the pattern until a marker is found and clicked
    /// or the iteration budget runs out.
    pub fn run_search(
        &mut self,
        levels: &[u8],
        pattern: SearchPattern,
    ) -> Result<bool, RunnerError> {
        let targets: Vec<String> = levels.iter().map(|&l| names::troop_level(l)).collect();
        let confidence = self.settings.matching.troop_confidence;
        let max_iterations = self.settings.run.max_search_iterations;
        let mut directions = pattern.directions();

        log::info!(
            "sweeping the map for {:?}, up to {} drags",
            targets,
            max_iterations
        );

        for iteration in 1..=max_iterations {
            log::info!("sweep {} of {}", iteration, max_iterations);

            let frame = self.grabber.capture()?;
            let gray = imageops::grayscale(&frame);
            for target in &targets {
                if let Some(pos) = self.bot.vision.find_center(&gray, target, confidence)? {
                    log::info!("found {} at ({}, {})", target, pos.0, pos.1);
                    self.click_at(pos)?;
                    return Ok(true);
                }
            }

            let direction = directions
                .next()
                .unwrap_or(crate::strategy::SweepDirection::Right);
            let (w, h) = frame.dimensions();
            let plan = direction.drag(
                (w as i32 / 2, h as i32 / 2),
                self.settings.run.drag_distance,
            );
            self.mouse.drag(
                plan.start,
                plan.end,
                self.settings.run.drag_duration_ms,
            )?;
            thread::sleep(Duration::from_millis(
                u64::from(self.settings.run.search_settle_ms),
            ));
        }

        log::info!("sweep budget exhausted, no markers found");
        Ok(false)
    }

    /// Find a template in the given frame and click it
    fn click_found(
        &mut self,
        gray: &GrayImage,
        name: &str,
        confidence: f32,
    ) -> Result<bool, RunnerError> {
        match self.bot.vision.find_center(gray, name, confidence)? {
            Some(pos) => {
                self.click_at(pos)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Click a position with the humanizer applied
    fn click_at(&mut self, pos: (i32, i32)) -> Result<(), RunnerError> {
        self.mouse.click(pos.0, pos.1, &mut self.humanizer)?;
        Ok(())
    }

    /// Give the user a moment to bring the game window to the front
    fn start_grace_period(&self) {
        let grace = self.settings.run.start_delay_secs;
        if grace == 0 {
            return;
        }
        log::info!("switch to the game window, starting in {} s...", grace);
        for remaining in (1..=grace).rev() {
            log::info!("{}...", remaining);
            thread::sleep(Duration::from_secs(1));
        }
    }
}
