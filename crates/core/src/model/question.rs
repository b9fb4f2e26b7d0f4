use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Invalid quiz content. A quiz with any of these problems never runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("question topic cannot be empty")]
    EmptyTopic,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have at least one choice")]
    NoChoices,

    #[error("correct choice {index} is out of range for {len} choices")]
    CorrectIndexOutOfRange { index: usize, len: usize },

    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {position}: {source}")]
    InvalidQuestion {
        position: usize,
        #[source]
        source: Box<ContentError>,
    },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    topic: String,
    prompt: String,
    choices: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if topic or prompt is blank, there are no choices,
    /// or `correct_index` does not point at a choice.
    pub fn new(
        topic: impl Into<String>,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, ContentError> {
        let topic = topic.into();
        let prompt = prompt.into();
        if topic.trim().is_empty() {
            return Err(ContentError::EmptyTopic);
        }
        if prompt.trim().is_empty() {
            return Err(ContentError::EmptyPrompt);
        }
        if choices.is_empty() {
            return Err(ContentError::NoChoices);
        }
        if correct_index >= choices.len() {
            return Err(ContentError::CorrectIndexOutOfRange {
                index: correct_index,
                len: choices.len(),
            });
        }

        Ok(Self {
            topic,
            prompt,
            choices,
            correct_index,
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn correct_choice(&self) -> &str {
        &self.choices[self.correct_index]
    }

    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

/// Authoring shape of a question, as found in quiz files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub topic: String,
    #[serde(rename = "question")]
    pub prompt: String,
    pub choices: Vec<String>,
    #[serde(rename = "correct")]
    pub correct_index: usize,
}

impl TryFrom<QuestionDraft> for Question {
    type Error = ContentError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        Question::new(draft.topic, draft.prompt, draft.choices, draft.correct_index)
    }
}

impl From<Question> for QuestionDraft {
    fn from(question: Question) -> Self {
        Self {
            topic: question.topic,
            prompt: question.prompt,
            choices: question.choices,
            correct_index: question.correct_index,
        }
    }
}
