use serde::Serialize;

use crate::model::{Answer, QuizId};

/// Outcome of one question, reported in the quiz's authored order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionDetail {
    /// Index of the question in the authored quiz.
    pub original_index: usize,
    /// Where the question appeared in this attempt's shuffled order.
    pub presented_position: usize,
    pub topic: String,
    pub prompt: String,
    pub answer: Answer,
    /// Text of the selected choice; `None` when timed out or unanswered.
    pub selected_text: Option<String>,
    pub correct_text: String,
    pub is_correct: bool,
    pub time_taken_secs: u32,
    pub points: u32,
    /// Portion of `points` earned for speed.
    pub speed_bonus: u32,
}

/// Final score and statistics for a completed attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResults {
    pub quiz_id: QuizId,
    pub total_score: u32,
    pub max_possible_score: u32,
    /// Exact percentage; round only for display.
    pub percentage: f64,
    /// Mean of the measured (non-zero) times, in seconds.
    pub average_time_secs: f64,
    /// Fastest measured (non-zero) time, in seconds.
    pub fastest_time_secs: u32,
    pub details: Vec<QuestionDetail>,
}

impl QuizResults {
    /// Percentage rounded to one decimal, e.g. `"47.0"`.
    #[must_use]
    pub fn percentage_display(&self) -> String {
        format!("{:.1}", self.percentage)
    }

    #[must_use]
    pub fn average_time_display(&self) -> String {
        format!("{:.1}", self.average_time_secs)
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.details.iter().filter(|d| d.is_correct).count()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.details.len()
    }
}
