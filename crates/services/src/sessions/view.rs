use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::shuffle::DisplayedChoice;

use super::service::QuizSession;

/// Presentation-agnostic snapshot of the question on screen.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSnapshot {
    pub position: usize,
    pub total_questions: usize,
    pub topic: String,
    pub prompt: String,
    pub displayed_choices: Vec<DisplayedChoice>,
    pub selected_original_index: Option<usize>,
    pub is_locked: bool,
    pub seconds_remaining: u32,
    pub time_limit_secs: u32,
    pub is_last: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

impl QuestionSnapshot {
    /// Snapshot of the current question, or `None` once the attempt is complete.
    #[must_use]
    pub fn from_session(session: &QuizSession, now: DateTime<Utc>) -> Option<Self> {
        let question = session.current_question()?;
        let position = session.position();
        let navigable = session.settings().allow_navigation();

        Some(Self {
            position,
            total_questions: session.total_questions(),
            topic: question.topic().to_string(),
            prompt: question.prompt().to_string(),
            displayed_choices: session.current_choices(),
            selected_original_index: session.answers().get(position).and_then(|a| a.choice()),
            is_locked: session.is_locked(position),
            seconds_remaining: session.remaining_secs(now),
            time_limit_secs: session.settings().max_time_per_question_secs(),
            is_last: session.is_last(),
            can_go_back: navigable && position > 0,
            can_go_forward: navigable && !session.is_last(),
        })
    }

    /// On-screen index of the selected choice, if any.
    #[must_use]
    pub fn selected_display_index(&self) -> Option<usize> {
        let selected = self.selected_original_index?;
        self.displayed_choices
            .iter()
            .position(|c| c.original_index == selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{Question, Quiz, QuizId, QuizSettings};
    use quiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn session() -> QuizSession {
        let questions = vec![
            Question::new("Rust", "First?", vec!["x".into(), "y".into()], 1).unwrap(),
            Question::new("Rust", "Second?", vec!["x".into(), "y".into()], 0).unwrap(),
        ];
        let quiz = Arc::new(Quiz::new(QuizId::new("snap"), "Snap", "", questions).unwrap());
        QuizSession::begin(quiz, QuizSettings::default(), &mut StdRng::seed_from_u64(1), fixed_now())
            .unwrap()
    }

    #[test]
    fn snapshot_reflects_selection_and_time() {
        let mut session = session();
        let shown = session.current_choices();
        session.select_displayed(0).unwrap();

        let snap = QuestionSnapshot::from_session(&session, fixed_now() + Duration::seconds(8)).unwrap();

        assert_eq!(snap.position, 0);
        assert_eq!(snap.total_questions, 2);
        assert_eq!(snap.seconds_remaining, 22);
        assert_eq!(snap.selected_original_index, Some(shown[0].original_index));
        assert_eq!(snap.selected_display_index(), Some(0));
        assert!(!snap.is_locked);
        assert!(!snap.is_last);
        assert!(!snap.can_go_back);
        assert!(!snap.can_go_forward);
    }

    #[test]
    fn no_snapshot_after_completion() {
        let mut session = session();
        for _ in 0..2 {
            session.select_displayed(0).unwrap();
            session.submit(fixed_now()).unwrap();
        }
        assert!(QuestionSnapshot::from_session(&session, fixed_now()).is_none());
    }
}
