//! Spiritbot CLI
//!
//! Flag-driven entry point for the battle loop, the map sweep, and the
//! template health check.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use spiritbot::config::Settings;
use spiritbot::runner::BattleRunner;
use spiritbot::strategy::{SearchPattern, SweepDirection};
use spiritbot::vision::TemplateLibrary;

#[derive(Parser)]
#[command(name = "spiritbot")]
#[command(about = "Screen-scraping battle automation for Battle Spirit")]
struct Cli {
    /// Template image directory
    #[arg(short, long, default_value = "templates")]
    templates: PathBuf,

    /// Settings file (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the auto-battle loop
    Battle {
        /// Number of battles to run
        #[arg(short = 'n', long)]
        battles: Option<u32>,

        /// Seconds to pause between battles
        #[arg(short, long)]
        wait_between: Option<u64>,

        /// Built-in settings preset
        #[arg(long, value_enum)]
        preset: Option<Preset>,
    },
    /// Sweep the world map for troop markers
    Search {
        /// Troop levels to look for (1-5); all levels when omitted
        #[arg(short, long)]
        levels: Vec<u8>,

        /// Sweep pattern
        #[arg(long, value_enum, default_value = "spiral")]
        pattern: PatternArg,

        /// Drag direction for the directional pattern
        #[arg(long, value_enum, default_value = "right")]
        direction: DirectionArg,
    },
    /// Report which required templates are missing
    CheckTemplates,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Aggressive,
    Defensive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PatternArg {
    Directional,
    Spiral,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Up,
    Down,
    Left,
    Right,
}

impl From<DirectionArg> for SweepDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Up => SweepDirection::Up,
            DirectionArg::Down => SweepDirection::Down,
            DirectionArg::Left => SweepDirection::Left,
            DirectionArg::Right => SweepDirection::Right,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Battle {
            battles,
            wait_between,
            preset,
        } => {
            let mut settings = load_settings(&cli.config, preset)?;
            if let Some(battles) = battles {
                settings.run.num_battles = battles;
            }
            if let Some(wait) = wait_between {
                settings.run.wait_between_secs = wait;
            }

            let mut runner = BattleRunner::new(settings, &cli.templates)
                .context("failed to set up the battle runner")?;
            let summary = runner.run_battles().context("battle loop failed")?;

            println!(
                "{} battles: {} victories, {} defeats, {} timeouts",
                summary.battles, summary.victories, summary.defeats, summary.timeouts
            );
        }
        Commands::Search {
            levels,
            pattern,
            direction,
        } => {
            let levels = if levels.is_empty() {
                vec![1, 2, 3, 4, 5]
            } else {
                anyhow::ensure!(
                    levels.iter().all(|&l| (1..=5).contains(&l)),
                    "troop levels must be between 1 and 5"
                );
                levels
            };
            let pattern = match pattern {
                PatternArg::Spiral => SearchPattern::Spiral,
                PatternArg::Directional => SearchPattern::Directional(direction.into()),
            };

            let settings = load_settings(&cli.config, None)?;
            let mut runner = BattleRunner::new(settings, &cli.templates)
                .context("failed to set up the runner")?;
            if runner.run_search(&levels, pattern)? {
                println!("troop marker found and clicked");
            } else {
                println!("no troop marker found within the sweep budget");
            }
        }
        Commands::CheckTemplates => {
            let library = TemplateLibrary::load_dir(&cli.templates)
                .context("failed to load the template directory")?;
            let missing = library.missing_required();
            if missing.is_empty() {
                println!(
                    "all required templates present ({} loaded)",
                    library.len()
                );
            } else {
                println!("missing {} required template(s):", missing.len());
                for name in missing {
                    println!("  - {}", name);
                }
            }
        }
    }

    Ok(())
}

/// Load settings from the config file, a preset, or the defaults
fn load_settings(config: &Option<PathBuf>, preset: Option<Preset>) -> anyhow::Result<Settings> {
    if let Some(path) = config {
        return Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()));
    }
    Ok(match preset {
        Some(Preset::Aggressive) => Settings::aggressive_preset(),
        Some(Preset::Defensive) => Settings::defensive_preset(),
        None => Settings::default(),
    })
}
