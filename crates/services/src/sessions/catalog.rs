use std::sync::Arc;

use tracing::{debug, warn};

use quiz_core::model::Quiz;
use storage::QuizSource;

use crate::error::SessionError;

/// The quizzes a player can choose from, in display order.
#[derive(Debug, Clone)]
pub struct QuizCatalog {
    quizzes: Vec<Arc<Quiz>>,
}

impl QuizCatalog {
    /// Load every quiz the source offers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuizAvailable` when the source yields nothing,
    /// and `SessionError::Source` when it fails outright.
    pub async fn load(source: &dyn QuizSource) -> Result<Self, SessionError> {
        let quizzes = source.load_all().await.inspect_err(|err| {
            warn!(error = %err, "quiz source failed");
        })?;
        if quizzes.is_empty() {
            return Err(SessionError::NoQuizAvailable);
        }
        debug!(count = quizzes.len(), "quiz catalog loaded");
        Ok(Self {
            quizzes: quizzes.into_iter().map(Arc::new).collect(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Quiz>> {
        self.quizzes.iter()
    }

    /// Quiz at `index` in display order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuizNotFound` when `index` is out of range.
    pub fn get(&self, index: usize) -> Result<Arc<Quiz>, SessionError> {
        self.quizzes
            .get(index)
            .cloned()
            .ok_or(SessionError::QuizNotFound { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuizId};
    use storage::InMemoryQuizSource;

    fn quiz(id: &str, order: i64) -> Quiz {
        let question = Question::new("T", "Q", vec!["a".into()], 0).unwrap();
        Quiz::new(QuizId::new(id), id, "", vec![question])
            .unwrap()
            .with_order(order)
    }

    #[tokio::test]
    async fn empty_source_means_no_quiz_available() {
        let source = InMemoryQuizSource::new();
        let err = QuizCatalog::load(&source).await.unwrap_err();
        assert!(err.is_no_quiz_available());
    }

    #[tokio::test]
    async fn quizzes_keep_source_order() {
        let source = InMemoryQuizSource::with_quizzes(vec![quiz("b", 2), quiz("a", 1)]);
        let catalog = QuizCatalog::load(&source).await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().id().as_str(), "a");
        assert!(matches!(
            catalog.get(5),
            Err(SessionError::QuizNotFound { index: 5 })
        ));
    }
}
