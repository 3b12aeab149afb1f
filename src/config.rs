use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::content::sets::SetLetter;
use crate::session::settings::{GameMode, GameSettings};

/// Last-used settings plus UI preferences, persisted so the settings form
/// re-seeds itself across restarts. Results are never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_mode")]
    pub mode: GameMode,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub set_letter: Option<char>,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_mode() -> GameMode {
    GameMode::Practice
}
fn default_question_count() -> usize {
    10
}
fn default_speed() -> f64 {
    0.75
}
fn default_theme() -> String {
    "sky".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            question_count: default_question_count(),
            speed: default_speed(),
            set_letter: None,
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("phonodrill")
            .join("config.toml")
    }

    /// Seed the settings form from the persisted values, clamping anything a
    /// hand-edited file may have broken.
    pub fn game_settings(&self) -> GameSettings {
        let mut settings = GameSettings {
            mode: self.mode,
            question_count: self.question_count,
            speed: self.speed,
            set_letter: self.set_letter.and_then(SetLetter::from_char),
        };
        settings.validate();
        settings
    }

    /// Remember the settings a session was started (or exited) with.
    pub fn remember(&mut self, settings: &GameSettings) {
        self.mode = settings.mode;
        self.question_count = settings.question_count;
        self.speed = settings.speed;
        self.set_letter = settings.set_letter.map(SetLetter::as_char);
    }
}
