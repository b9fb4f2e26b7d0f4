use quiz_core::model::QuizResults;

use crate::error::SessionError;
use crate::sessions::QuestionSnapshot;

/// Receives state changes from a running quiz.
///
/// Implementations render; they never mutate the session. Calls arrive on the
/// session loop's task, one at a time.
pub trait Presenter: Send + Sync {
    /// Called after every transition and on every timer tick while a question is shown.
    fn show_question(&self, snapshot: &QuestionSnapshot);

    /// Called once per completed attempt.
    fn show_results(&self, results: &QuizResults);

    /// A command was refused; the session is unchanged.
    fn show_rejected(&self, _error: &SessionError) {}

    /// The player left the quiz.
    fn session_closed(&self) {}
}
