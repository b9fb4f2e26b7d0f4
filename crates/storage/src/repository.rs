use async_trait::async_trait;
use quiz_core::model::{ContentError, Quiz};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by quiz sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("no valid quizzes found")]
    NoQuizzes,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Provider of validated quizzes, in listing order.
#[async_trait]
pub trait QuizSource: Send + Sync {
    /// Load every available quiz.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the source cannot be read. An empty result is
    /// not an error at this layer; callers decide how to treat it.
    async fn load_all(&self) -> Result<Vec<Quiz>, SourceError>;
}

/// Simple in-memory source for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryQuizSource {
    quizzes: Arc<Mutex<Vec<Quiz>>>,
}

impl InMemoryQuizSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quizzes(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: Arc::new(Mutex::new(quizzes)),
        }
    }

    /// Add a quiz to the source.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Connection` if the inner lock is poisoned.
    pub fn insert(&self, quiz: Quiz) -> Result<(), SourceError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        guard.push(quiz);
        Ok(())
    }
}

#[async_trait]
impl QuizSource for InMemoryQuizSource {
    async fn load_all(&self) -> Result<Vec<Quiz>, SourceError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        let mut quizzes = guard.clone();
        quizzes.sort_by_key(Quiz::order);
        Ok(quizzes)
    }
}
