//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ContentError, NicknameError};
use storage::SourceError;

/// A transition was requested in a state that does not allow it.
///
/// The session is left unchanged when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreconditionViolation {
    #[error("session already completed")]
    SessionComplete,
    #[error("question {position} is already locked")]
    QuestionLocked { position: usize },
    #[error("question {position} has no selected answer")]
    NoAnswerSelected { position: usize },
    #[error("choice {index} is out of range for {len} choices")]
    ChoiceOutOfRange { index: usize, len: usize },
    #[error("navigation is disabled for timed quizzes")]
    NavigationDisabled,
    #[error("no question in that direction from {position}")]
    NavigationOutOfBounds { position: usize },
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no quiz available")]
    NoQuizAvailable,
    #[error("quiz {index} does not exist")]
    QuizNotFound { index: usize },
    #[error("session channel closed")]
    Closed,
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl SessionError {
    /// True when the quiz list could not be produced, whether empty or failed.
    #[must_use]
    pub fn is_no_quiz_available(&self) -> bool {
        matches!(self, SessionError::NoQuizAvailable | SessionError::Source(_))
    }
}

/// Errors emitted while reporting a score to the leaderboard.
///
/// All of these are recoverable: the caller may retry the same submission.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error("leaderboard is not configured")]
    Disabled,
    #[error(transparent)]
    Nickname(#[from] NicknameError),
    #[error("leaderboard rejected the score ({status}): {reason}")]
    Rejected {
        status: reqwest::StatusCode,
        reason: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
