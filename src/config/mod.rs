//! Configuration module
//!
//! Handles user settings, presets, and automation preferences.

pub mod settings;

pub use settings::{Settings, SettingsError};
