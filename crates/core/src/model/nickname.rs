use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Longest nickname the leaderboard accepts, in characters.
pub const MAX_NICKNAME_CHARS: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NicknameError {
    #[error("nickname cannot be empty")]
    Empty,
    #[error("nickname must be at most {max} characters, got {len}")]
    TooLong { len: usize, max: usize },
}

/// A trimmed, non-empty leaderboard name of at most 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Nickname(String);

impl Nickname {
    /// # Errors
    ///
    /// Returns `NicknameError` when the trimmed name is empty or too long.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, NicknameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(NicknameError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_NICKNAME_CHARS {
            return Err(NicknameError::TooLong {
                len,
                max: MAX_NICKNAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
