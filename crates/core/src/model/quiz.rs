use serde::{Deserialize, Serialize};

use crate::model::ids::QuizId;
use crate::model::question::{ContentError, Question, QuestionDraft};

/// An authored quiz: a titled, ordered, non-empty list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quiz {
    id: QuizId,
    title: String,
    description: String,
    order: i64,
    questions: Vec<Question>,
}

impl Quiz {
    /// Creates a validated quiz.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::EmptyTitle` for a blank title and
    /// `ContentError::NoQuestions` when `questions` is empty.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, ContentError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ContentError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(ContentError::NoQuestions);
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            order: 0,
            questions,
        })
    }

    /// Builds a quiz from its authoring shape, validating every question.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidQuestion` naming the first bad question,
    /// or the quiz-level errors of [`Quiz::new`].
    pub fn from_draft(id: QuizId, draft: QuizDraft) -> Result<Self, ContentError> {
        let questions = draft
            .questions
            .into_iter()
            .enumerate()
            .map(|(position, q)| {
                Question::try_from(q).map_err(|source| ContentError::InvalidQuestion {
                    position,
                    source: Box::new(source),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(id, draft.title, draft.description, questions)
    }

    /// Position of this quiz in listings; lower sorts first.
    #[must_use]
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn order(&self) -> i64 {
        self.order
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// Authoring shape of a quiz file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<QuestionDraft>,
}
