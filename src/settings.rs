//! Host settings and preferences
//!
//! Stored as JSON, separately from level packs and completion records.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    FAST_UPDATES_PER_SECOND, LOSE_BUFFER_SECS, NORMAL_UPDATES_PER_SECOND, SLOW_UPDATES_PER_SECOND,
};
use crate::persistence::PersistenceError;

/// Tick rate presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedMode {
    #[default]
    Normal,
    Slow,
    Fast,
}

impl SpeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedMode::Normal => "Normal",
            SpeedMode::Slow => "Slow",
            SpeedMode::Fast => "Fast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(SpeedMode::Normal),
            "slow" => Some(SpeedMode::Slow),
            "fast" => Some(SpeedMode::Fast),
            _ => None,
        }
    }

    pub fn updates_per_second(&self) -> f32 {
        match self {
            SpeedMode::Normal => NORMAL_UPDATES_PER_SECOND,
            SpeedMode::Slow => SLOW_UPDATES_PER_SECOND,
            SpeedMode::Fast => FAST_UPDATES_PER_SECOND,
        }
    }

    /// Slow-motion toggle; leaving fast mode always lands on normal
    pub fn toggled(&self) -> Self {
        match self {
            SpeedMode::Normal => SpeedMode::Slow,
            SpeedMode::Slow | SpeedMode::Fast => SpeedMode::Normal,
        }
    }
}

/// Host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Files ===
    /// Level pack to play
    pub levels_path: PathBuf,
    /// Completion records (current format)
    pub progress_path: PathBuf,
    /// Headerless completion records from older releases
    pub legacy_progress_path: Option<PathBuf>,

    // === Play ===
    /// Seconds the losing fade lasts before the level restarts
    pub lose_buffer_secs: f64,
    /// Speed a level starts at
    pub start_speed: SpeedMode,

    // === Audio ===
    pub play_sounds: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            levels_path: PathBuf::from("levels.mbl"),
            progress_path: PathBuf::from("progress.mbp"),
            legacy_progress_path: Some(PathBuf::from("completion.mbp")),

            lose_buffer_secs: LOSE_BUFFER_SECS,
            start_speed: SpeedMode::Normal,

            play_sounds: true,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {e})", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings in {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
