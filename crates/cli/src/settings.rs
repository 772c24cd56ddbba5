use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use pronounce_core::shared::constants::{
    DEFAULT_ACCURACY_THRESHOLD, DEFAULT_DATASET_PATH, DEFAULT_EVALUATION_LIMIT,
    DEFAULT_PERFECT_THRESHOLD,
};

/// Text cleanup applied before scoring, as stored in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    Basic,
    Strict,
}

/// Persisted defaults for the CLI; command-line flags override them.
///
/// Fields missing from the file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub accuracy_threshold: f64,
    pub perfect_threshold: f64,
    /// Normalization for interactive practice and `score`.
    pub practice_normalization: Normalization,
    pub dataset_path: PathBuf,
    pub evaluation_limit: usize,
    /// Worker threads for `evaluate`; 0 means one per CPU.
    pub workers: usize,
    /// Spoken language passed to the recognizer.
    pub language: String,
    /// Directory searched for the Whisper model before downloading it.
    pub model_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accuracy_threshold: DEFAULT_ACCURACY_THRESHOLD,
            perfect_threshold: DEFAULT_PERFECT_THRESHOLD,
            practice_normalization: Normalization::Basic,
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            evaluation_limit: DEFAULT_EVALUATION_LIMIT,
            workers: 0,
            language: "en".to_string(),
            model_dir: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("PronunciationChecker").join("settings.json"))
    }

    /// Loads settings, falling back to defaults if the file is missing or
    /// unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid settings file {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Writes the settings to [`Settings::config_path`] and returns that path.
    pub fn save(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("No config directory available")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.accuracy_threshold) {
            return Err(format!(
                "Accuracy threshold must be between 0 and 100, got {}",
                self.accuracy_threshold
            ));
        }
        if !(0.0..=100.0).contains(&self.perfect_threshold) {
            return Err(format!(
                "Perfect threshold must be between 0 and 100, got {}",
                self.perfect_threshold
            ));
        }
        if self.language.trim().is_empty() {
            return Err("Language must not be empty".to_string());
        }
        if self.accuracy_threshold > self.perfect_threshold {
            return Err(format!(
                "Accuracy threshold ({}) must not exceed perfect threshold ({})",
                self.accuracy_threshold, self.perfect_threshold
            ));
        }
        Ok(())
    }
}
