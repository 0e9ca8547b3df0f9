//! Command-to-input translation
//!
//! Turns a [`BattleCommand`] into the short click/wait sequence that
//! performs it on screen. Waits between clicks come from the timing
//! settings; the post-play pause is humanized.

use crate::config::Settings;
use crate::stealth::Humanizer;
use crate::strategy::BattleCommand;
use crate::BotAction;

/// Build the input sequence for one command
pub fn build(
    command: &BattleCommand,
    settings: &Settings,
    humanizer: &mut Humanizer,
) -> Vec<BotAction> {
    let timings = &settings.timings;

    match command {
        BattleCommand::MergeCards { at }
        | BattleCommand::UpgradePopulation { at }
        | BattleCommand::BuyCard { at }
        | BattleCommand::RefreshShop { at } => vec![
            BotAction::Click { x: at.0, y: at.1 },
            BotAction::Wait {
                duration_ms: timings.purchase_settle_ms,
            },
        ],
        BattleCommand::PlayCard { card, target, .. } => vec![
            BotAction::Click {
                x: card.0,
                y: card.1,
            },
            BotAction::Wait {
                duration_ms: timings.tap_pause_ms,
            },
            BotAction::Click {
                x: target.0,
                y: target.1,
            },
            BotAction::Wait {
                duration_ms: humanizer.post_play_wait() as u32,
            },
        ],
        BattleCommand::Idle { wait_ms } => vec![BotAction::Wait {
            duration_ms: *wait_ms,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_sequence() {
        let settings = Settings::default();
        let mut humanizer = Humanizer::new();

        let actions = build(
            &BattleCommand::BuyCard { at: (900, 800) },
            &settings,
            &mut humanizer,
        );

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], BotAction::Click { x: 900, y: 800 });
        assert_eq!(
            actions[1],
            BotAction::Wait {
                duration_ms: settings.timings.purchase_settle_ms
            }
        );
    }

    #[test]
    fn test_play_card_is_two_clicks_with_pause() {
        let settings = Settings::default();
        let mut humanizer = Humanizer::new();

        let actions = build(
            &BattleCommand::PlayCard {
                slot: 2,
                card: (300, 950),
                target: (700, 400),
            },
            &settings,
            &mut humanizer,
        );

        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0], BotAction::Click { x: 300, y: 950 });
        assert_eq!(
            actions[1],
            BotAction::Wait {
                duration_ms: settings.timings.tap_pause_ms
            }
        );
        assert_eq!(actions[2], BotAction::Click { x: 700, y: 400 });
        match actions[3] {
            BotAction::Wait { duration_ms } => {
                assert!((1500..=3000).contains(&duration_ms));
            }
            ref other => panic!("expected wait, got {:?}", other),
        }
    }

    #[test]
    fn test_idle_waits_out_the_poll() {
        let settings = Settings::default();
        let mut humanizer = Humanizer::new();

        let actions = build(
            &BattleCommand::Idle { wait_ms: 500 },
            &settings,
            &mut humanizer,
        );
        assert_eq!(actions, vec![BotAction::Wait { duration_ms: 500 }]);
    }
}
