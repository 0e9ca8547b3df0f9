//! Template library
//!
//! Loads the reference images the bot matches against from a directory and
//! tracks which of the required templates are present. Templates are stored
//! as grayscale since matching runs on luma.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::GrayImage;
use once_cell::sync::Lazy;

use super::VisionError;

/// Well-known template file names
pub mod names {
    pub const BATTLE_BUTTON: &str = "battle_button.png";
    pub const CONFIRM_BATTLE: &str = "confirm_battle.png";
    pub const VICTORY_SCREEN: &str = "victory_screen.png";
    pub const DEFEAT_SCREEN: &str = "defeat_screen.png";
    pub const OK_BUTTON: &str = "ok_button.png";
    pub const ENERGY_FULL: &str = "energy_full.png";
    pub const GOLD_COIN: &str = "gold_coin.png";
    pub const REFRESH_CARDS: &str = "refresh_cards.png";
    pub const REFRESH_COST: &str = "refresh_cost.png";
    pub const POPULATION: &str = "population.png";
    pub const BUY_CARD: &str = "buy_card.png";
    pub const UPGRADE_POPULATION: &str = "upgrade_population.png";
    pub const SAME_CARD: &str = "same_card.png";

    /// Card slot template name for slot `1..=4`
    pub fn card_slot(slot: usize) -> String {
        format!("card_slot_{}.png", slot)
    }

    /// Troop marker template name for level `1..=5`
    pub fn troop_level(level: u8) -> String {
        format!("troop_level{}.png", level)
    }
}

/// The templates a battle run cannot do without, with what each one marks
pub static REQUIRED_TEMPLATES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        (names::BATTLE_BUTTON, "battle button on the main menu"),
        (names::CONFIRM_BATTLE, "confirm button before a match"),
        (names::VICTORY_SCREEN, "victory banner"),
        (names::DEFEAT_SCREEN, "defeat banner"),
        (names::OK_BUTTON, "result confirmation button"),
        ("card_slot_1.png", "hand card slot 1"),
        ("card_slot_2.png", "hand card slot 2"),
        ("card_slot_3.png", "hand card slot 3"),
        ("card_slot_4.png", "hand card slot 4"),
        (names::ENERGY_FULL, "full energy bar indicator"),
        (names::GOLD_COIN, "gold counter icon"),
        (names::REFRESH_CARDS, "shop refresh button"),
        (names::REFRESH_COST, "shop refresh cost label"),
        (names::POPULATION, "population counter icon"),
        (names::BUY_CARD, "purchasable shop card marker"),
        (names::UPGRADE_POPULATION, "population upgrade button"),
        (names::SAME_CARD, "duplicate card marker for merging"),
    ]
});

/// A loaded template and the screen region it should be searched in
pub struct Template {
    /// Grayscale template pixels
    pub image: GrayImage,
    /// Optional search region (x, y, w, h) in frame pixels; full frame when `None`
    pub region: Option<(u32, u32, u32, u32)>,
}

/// On-disk template collection
pub struct TemplateLibrary {
    templates: HashMap<String, Template>,
    dir: PathBuf,
}

impl TemplateLibrary {
    /// Load every PNG in the directory as a template.
    ///
    /// A missing directory is an error; missing individual templates are
    /// not, they just make the matcher report a miss for that name.
    pub fn load_dir(dir: &Path) -> Result<Self, VisionError> {
        if !dir.is_dir() {
            return Err(VisionError::TemplateDirMissing(dir.display().to_string()));
        }

        let mut templates = HashMap::new();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| VisionError::TemplateLoad(dir.display().to_string(), e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "png") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            match image::open(&path) {
                Ok(img) => {
                    templates.insert(
                        name.to_string(),
                        Template {
                            image: img.to_luma8(),
                            region: None,
                        },
                    );
                }
                Err(e) => {
                    log::warn!("could not load template {}: {}", path.display(), e);
                }
            }
        }

        log::info!("loaded {} templates from {}", templates.len(), dir.display());

        Ok(Self {
            templates,
            dir: dir.to_path_buf(),
        })
    }

    /// Create an empty library (for tests and dry runs)
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            dir: PathBuf::new(),
        }
    }

    /// Insert a template directly
    pub fn insert(&mut self, name: &str, image: GrayImage) {
        self.templates.insert(
            name.to_string(),
            Template {
                image,
                region: None,
            },
        );
    }

    /// Restrict a template's search to a frame region
    pub fn set_region(&mut self, name: &str, region: (u32, u32, u32, u32)) {
        if let Some(template) = self.templates.get_mut(name) {
            template.region = Some(region);
        }
    }

    /// Get a template by file name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Check whether a template is loaded
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Number of loaded templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The directory the templates were loaded from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names from the required manifest that are not loaded
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_TEMPLATES
            .iter()
            .filter(|(name, _)| !self.templates.contains_key(*name))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Log a warning for each missing required template
    pub fn warn_missing(&self) {
        let missing = self.missing_required();
        if missing.is_empty() {
            return;
        }

        log::warn!("missing {} required template(s):", missing.len());
        for (name, purpose) in REQUIRED_TEMPLATES.iter() {
            if missing.contains(name) {
                log::warn!("  - {} ({})", name, purpose);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn solid_gray(w: u32, h: u32, v: u8) -> GrayImage {
        ImageBuffer::from_pixel(w, h, Luma([v]))
    }

    #[test]
    fn test_load_dir_reads_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("battle_button.png");
        solid_gray(8, 8, 128).save(&path).unwrap();

        // A non-PNG file should be skipped
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let library = TemplateLibrary::load_dir(dir.path()).unwrap();
        assert_eq!(library.len(), 1);
        assert!(library.contains(names::BATTLE_BUTTON));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let result = TemplateLibrary::load_dir(Path::new("/nonexistent/templates"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_reporting() {
        let mut library = TemplateLibrary::empty();
        assert_eq!(library.missing_required().len(), REQUIRED_TEMPLATES.len());

        library.insert(names::BATTLE_BUTTON, solid_gray(4, 4, 0));
        let missing = library.missing_required();
        assert_eq!(missing.len(), REQUIRED_TEMPLATES.len() - 1);
        assert!(!missing.contains(&names::BATTLE_BUTTON));
    }

    #[test]
    fn test_template_names() {
        assert_eq!(names::card_slot(2), "card_slot_2.png");
        assert_eq!(names::troop_level(5), "troop_level5.png");
    }

    #[test]
    fn test_set_region() {
        let mut library = TemplateLibrary::empty();
        library.insert(names::GOLD_COIN, solid_gray(4, 4, 0));
        library.set_region(names::GOLD_COIN, (0, 0, 100, 50));

        let template = library.get(names::GOLD_COIN).unwrap();
        assert_eq!(template.region, Some((0, 0, 100, 50)));
    }
}
