use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("time per question must be between 1 and {max} seconds, got {provided}")]
    InvalidTimeLimit { provided: u32, max: u32 },

    #[error("base points must be > 0")]
    InvalidBasePoints,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Upper bound for a per-question time limit (one hour).
pub const MAX_TIME_LIMIT_SECS: u32 = 3_600;

/// Timing and scoring knobs for a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuizSettingsDraft", into = "QuizSettingsDraft")]
pub struct QuizSettings {
    max_time_per_question_secs: u32,
    base_points: u32,
    bonus_max: u32,
    allow_navigation: bool,
}

impl Default for QuizSettings {
    /// 30 seconds per question, 100 points per correct answer plus up to 50
    /// for speed, no free navigation.
    fn default() -> Self {
        Self {
            max_time_per_question_secs: 30,
            base_points: 100,
            bonus_max: 50,
            allow_navigation: false,
        }
    }
}

impl QuizSettings {
    /// Creates custom settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the time limit is zero or above
    /// [`MAX_TIME_LIMIT_SECS`], or base points are zero.
    pub fn new(
        max_time_per_question_secs: u32,
        base_points: u32,
        bonus_max: u32,
        allow_navigation: bool,
    ) -> Result<Self, SettingsError> {
        if max_time_per_question_secs == 0 || max_time_per_question_secs > MAX_TIME_LIMIT_SECS {
            return Err(SettingsError::InvalidTimeLimit {
                provided: max_time_per_question_secs,
                max: MAX_TIME_LIMIT_SECS,
            });
        }
        if base_points == 0 {
            return Err(SettingsError::InvalidBasePoints);
        }

        Ok(Self {
            max_time_per_question_secs,
            base_points,
            bonus_max,
            allow_navigation,
        })
    }

    /// Default scoring with a custom time limit.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidTimeLimit` for an out-of-range limit.
    pub fn with_time_limit(self, secs: u32) -> Result<Self, SettingsError> {
        Self::new(secs, self.base_points, self.bonus_max, self.allow_navigation)
    }

    #[must_use]
    pub fn with_navigation(mut self, allow: bool) -> Self {
        self.allow_navigation = allow;
        self
    }

    #[must_use]
    pub fn max_time_per_question_secs(&self) -> u32 {
        self.max_time_per_question_secs
    }

    #[must_use]
    pub fn base_points(&self) -> u32 {
        self.base_points
    }

    #[must_use]
    pub fn bonus_max(&self) -> u32 {
        self.bonus_max
    }

    /// When true, previous/next navigation between questions is permitted.
    #[must_use]
    pub fn allow_navigation(&self) -> bool {
        self.allow_navigation
    }

    /// Best possible score for one question.
    #[must_use]
    pub fn max_points_per_question(&self) -> u32 {
        self.base_points.saturating_add(self.bonus_max)
    }
}

/// Unvalidated settings as they appear in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettingsDraft {
    pub max_time_per_question_secs: u32,
    pub base_points: u32,
    pub bonus_max: u32,
    #[serde(default)]
    pub allow_navigation: bool,
}

impl TryFrom<QuizSettingsDraft> for QuizSettings {
    type Error = SettingsError;

    fn try_from(draft: QuizSettingsDraft) -> Result<Self, Self::Error> {
        Self::new(
            draft.max_time_per_question_secs,
            draft.base_points,
            draft.bonus_max,
            draft.allow_navigation,
        )
    }
}

impl From<QuizSettings> for QuizSettingsDraft {
    fn from(settings: QuizSettings) -> Self {
        Self {
            max_time_per_question_secs: settings.max_time_per_question_secs,
            base_points: settings.base_points,
            bonus_max: settings.bonus_max,
            allow_navigation: settings.allow_navigation,
        }
    }
}
