//! Synthetic mouse input
//!
//! Wraps the `rustautogui` backend behind the small surface the bot needs:
//! humanized clicks, map drags, and execution of action sequences.

pub mod actions;

use std::thread;
use std::time::Duration;

use rustautogui::RustAutoGui;

use crate::stealth::{Humanizer, StealthConfig};
use crate::BotAction;

/// Input errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("mouse backend error: {0}")]
    Backend(String),
}

/// Mouse controller for the host desktop
pub struct MouseController {
    gui: RustAutoGui,
    stealth: StealthConfig,
}

impl MouseController {
    /// Initialize the input backend
    pub fn new(stealth: StealthConfig) -> Result<Self, InputError> {
        let gui = RustAutoGui::new(false).map_err(|e| InputError::Backend(e.to_string()))?;
        Ok(Self { gui, stealth })
    }

    /// Click at a position, with a humanized offset when enabled
    pub fn click(
        &mut self,
        x: i32,
        y: i32,
        humanizer: &mut Humanizer,
    ) -> Result<(), InputError> {
        let (dx, dy) = if self.stealth.humanize_position {
            humanizer.click_offset(self.stealth.position_offset_max)
        } else {
            (0, 0)
        };
        let (tx, ty) = ((x + dx).max(0) as u32, (y + dy).max(0) as u32);

        self.gui
            .move_mouse_to_pos(tx, ty, 0.0)
            .map_err(|e| InputError::Backend(e.to_string()))?;
        // Let the cursor settle before the press registers
        thread::sleep(Duration::from_millis(20));
        self.gui
            .left_click()
            .map_err(|e| InputError::Backend(e.to_string()))?;

        log::debug!("clicked ({}, {})", tx, ty);
        Ok(())
    }

    /// Drag from one point to another over a duration
    pub fn drag(
        &mut self,
        start: (i32, i32),
        end: (i32, i32),
        duration_ms: u32,
    ) -> Result<(), InputError> {
        self.gui
            .move_mouse_to_pos(start.0.max(0) as u32, start.1.max(0) as u32, 0.0)
            .map_err(|e| InputError::Backend(e.to_string()))?;
        self.gui
            .drag_mouse_to_pos(
                end.0.max(0) as u32,
                end.1.max(0) as u32,
                duration_ms as f32 / 1000.0,
            )
            .map_err(|e| InputError::Backend(e.to_string()))?;

        log::debug!(
            "dragged ({}, {}) -> ({}, {})",
            start.0,
            start.1,
            end.0,
            end.1
        );
        Ok(())
    }

    /// Execute an action sequence, sleeping through the waits
    pub fn execute(
        &mut self,
        actions: &[BotAction],
        humanizer: &mut Humanizer,
    ) -> Result<(), InputError> {
        for action in actions {
            match action {
                BotAction::None => {}
                BotAction::Click { x, y } => {
                    if self.stealth.humanize_timing {
                        thread::sleep(Duration::from_millis(humanizer.action_delay()));
                    }
                    self.click(*x, *y, humanizer)?;
                }
                BotAction::Drag {
                    start_x,
                    start_y,
                    end_x,
                    end_y,
                    duration_ms,
                } => {
                    let duration = if self.stealth.humanize_timing {
                        humanizer.drag_duration(*duration_ms)
                    } else {
                        *duration_ms
                    };
                    self.drag((*start_x, *start_y), (*end_x, *end_y), duration)?;
                }
                BotAction::Wait { duration_ms } => {
                    let wait = if self.stealth.humanize_timing {
                        humanizer.humanize_delay(
                            u64::from(*duration_ms),
                            self.stealth.timing_variance_percent,
                        )
                    } else {
                        u64::from(*duration_ms)
                    };
                    thread::sleep(Duration::from_millis(wait));
                }
            }

            if self.stealth.enable_micro_pauses
                && humanizer.should_micro_pause(self.stealth.micro_pause_probability)
            {
                thread::sleep(Duration::from_millis(humanizer.micro_pause_duration()));
            }
        }
        Ok(())
    }
}
