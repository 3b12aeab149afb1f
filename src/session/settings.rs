use serde::{Deserialize, Serialize};

use crate::content::sets::{SET_QUESTION_COUNT, SetLetter};

pub const QUESTION_COUNT_OPTIONS: [usize; 4] = [10, 20, 50, 100];
pub const SPEED_MIN: f64 = 0.5;
pub const SPEED_MAX: f64 = 1.5;
pub const SPEED_STEP: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Practice,
    Competition,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Practice => "practice",
            GameMode::Competition => "competition",
        }
    }
}

/// What the settings screen hands the core at session start. Immutable for
/// the session; handed back unchanged if the player exits mid-session so the
/// form can re-seed itself.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSettings {
    pub mode: GameMode,
    /// Practice only; competition always runs the full set.
    pub question_count: usize,
    /// Practice speech rate scale, 0.5x..1.5x.
    pub speed: f64,
    /// Required in competition mode.
    pub set_letter: Option<SetLetter>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Practice,
            question_count: QUESTION_COUNT_OPTIONS[0],
            speed: 0.75,
            set_letter: None,
        }
    }
}

impl GameSettings {
    /// Competition without a chosen set cannot start; Start is a no-op then.
    pub fn is_startable(&self) -> bool {
        match self.mode {
            GameMode::Practice => true,
            GameMode::Competition => self.set_letter.is_some(),
        }
    }

    pub fn effective_question_count(&self) -> usize {
        match self.mode {
            GameMode::Practice => self.question_count,
            GameMode::Competition => SET_QUESTION_COUNT,
        }
    }

    /// Clamp values that may have come from a stale or hand-edited config.
    pub fn validate(&mut self) {
        self.speed = self.speed.clamp(SPEED_MIN, SPEED_MAX);
        if !QUESTION_COUNT_OPTIONS.contains(&self.question_count) {
            self.question_count = QUESTION_COUNT_OPTIONS[0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn competition_requires_a_set() {
        let mut settings = GameSettings {
            mode: GameMode::Competition,
            ..GameSettings::default()
        };
        assert!(!settings.is_startable());

        settings.set_letter = Some(SetLetter::D);
        assert!(settings.is_startable());
        assert_eq!(settings.effective_question_count(), SET_QUESTION_COUNT);
    }

    #[test]
    fn practice_is_always_startable() {
        let settings = GameSettings::default();
        assert!(settings.is_startable());
        assert_eq!(settings.effective_question_count(), 10);
    }

    #[test]
    fn validate_clamps_stale_values() {
        let mut settings = GameSettings {
            question_count: 37,
            speed: 9.0,
            ..GameSettings::default()
        };
        settings.validate();
        assert_eq!(settings.question_count, 10);
        assert!((settings.speed - SPEED_MAX).abs() < f64::EPSILON);
    }
}
