use std::sync::{Arc, Mutex};

use quiz_core::model::{Question, Quiz, QuizId, QuizResults, QuizSettings};
use quiz_core::time::fixed_clock;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{
    Presenter, QuestionSnapshot, QuizCatalog, QuizRunner, SessionCommand, SessionError,
};
use storage::InMemoryQuizSource;

#[derive(Default)]
struct RecordingPresenter {
    snapshots: Mutex<Vec<QuestionSnapshot>>,
    results: Mutex<Vec<QuizResults>>,
    rejected: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl Presenter for RecordingPresenter {
    fn show_question(&self, snapshot: &QuestionSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }

    fn show_results(&self, results: &QuizResults) {
        self.results.lock().unwrap().push(results.clone());
    }

    fn show_rejected(&self, error: &SessionError) {
        self.rejected.lock().unwrap().push(error.to_string());
    }

    fn session_closed(&self) {
        *self.closed.lock().unwrap() = true;
    }
}

fn single_choice_quiz() -> Quiz {
    let questions = vec![
        Question::new("Rust", "Which keyword declares a binding?", vec!["let".into()], 0).unwrap(),
        Question::new("Rust", "Which macro prints a line?", vec!["println!".into()], 0).unwrap(),
    ];
    Quiz::new(QuizId::new("basics"), "Basics", "Warm-up", questions).unwrap()
}

async fn start(presenter: Arc<RecordingPresenter>, settings: QuizSettings) -> QuizRunner {
    let source = InMemoryQuizSource::with_quizzes(vec![single_choice_quiz()]);
    let catalog = QuizCatalog::load(&source).await.unwrap();
    QuizRunner::begin_with_rng(
        catalog.get(0).unwrap(),
        settings,
        fixed_clock(),
        presenter,
        StdRng::seed_from_u64(11),
    )
    .unwrap()
}

#[tokio::test]
async fn full_attempt_through_handle() {
    let presenter = Arc::new(RecordingPresenter::default());
    let runner = start(Arc::clone(&presenter), QuizSettings::default()).await;
    let handle = runner.handle();
    let task = tokio::spawn(runner.run());

    for command in [
        SessionCommand::Select(0),
        SessionCommand::Submit,
        SessionCommand::Select(0),
        SessionCommand::Submit,
        SessionCommand::Quit,
    ] {
        handle.send(command).await.unwrap();
    }

    let results = task.await.unwrap().expect("attempt completed");
    assert_eq!(results.total_score, 300);
    assert_eq!(results.max_possible_score, 300);
    assert_eq!(results.percentage_display(), "100.0");
    assert_eq!(presenter.results.lock().unwrap().len(), 1);
    assert!(*presenter.closed.lock().unwrap());

    let first = presenter.snapshots.lock().unwrap()[0].clone();
    assert_eq!(first.position, 0);
    assert_eq!(first.total_questions, 2);
    assert_eq!(first.seconds_remaining, 30);

    assert!(handle.send(SessionCommand::Submit).await.is_err());
}

#[tokio::test]
async fn rejected_commands_reach_the_presenter() {
    let presenter = Arc::new(RecordingPresenter::default());
    let runner = start(Arc::clone(&presenter), QuizSettings::default()).await;
    let handle = runner.handle();
    let task = tokio::spawn(runner.run());

    handle.send(SessionCommand::Submit).await.unwrap();
    handle.send(SessionCommand::Next).await.unwrap();
    handle.send(SessionCommand::Select(4)).await.unwrap();
    handle.send(SessionCommand::Quit).await.unwrap();

    assert!(task.await.unwrap().is_none());
    assert_eq!(presenter.rejected.lock().unwrap().len(), 3);
    assert!(presenter.results.lock().unwrap().is_empty());
}

#[tokio::test]
async fn restart_after_completion_starts_a_fresh_attempt() {
    let presenter = Arc::new(RecordingPresenter::default());
    let settings = QuizSettings::default().with_navigation(true);
    let runner = start(Arc::clone(&presenter), settings).await;
    let handle = runner.handle();
    let task = tokio::spawn(runner.run());

    for command in [
        SessionCommand::Select(0),
        SessionCommand::Submit,
        SessionCommand::Select(0),
        SessionCommand::Submit,
        SessionCommand::Restart,
        SessionCommand::Quit,
    ] {
        handle.send(command).await.unwrap();
    }

    assert!(task.await.unwrap().is_none());
    let snapshots = presenter.snapshots.lock().unwrap();
    let last = snapshots.last().unwrap();
    assert_eq!(last.position, 0);
    assert_eq!(last.selected_original_index, None);
    assert!(!last.is_locked);
}
