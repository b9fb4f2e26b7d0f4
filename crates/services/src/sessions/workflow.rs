use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tracing::debug;

use quiz_core::Clock;
use quiz_core::model::{Quiz, QuizResults, QuizSettings};

use super::service::{QuizSession, TickOutcome, TimerToken, Transition};
use super::view::QuestionSnapshot;
use crate::error::SessionError;
use crate::presenter::Presenter;
use crate::timer::QuestionTimer;

const EVENT_QUEUE_CAPACITY: usize = 64;

/// Player input understood by the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Select by on-screen position.
    Select(usize),
    /// Select by authored choice index.
    SelectOriginal(usize),
    Submit,
    Previous,
    Next,
    Restart,
    Quit,
}

/// Everything the loop reacts to, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Command(SessionCommand),
    Tick(TimerToken),
}

impl From<TimerToken> for SessionEvent {
    fn from(token: TimerToken) -> Self {
        SessionEvent::Tick(token)
    }
}

impl From<SessionCommand> for SessionEvent {
    fn from(command: SessionCommand) -> Self {
        SessionEvent::Command(command)
    }
}

/// Cloneable input side of a running [`QuizRunner`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Queue a command for the session loop.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the loop has already stopped.
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.events
            .send(SessionEvent::Command(command))
            .await
            .map_err(|_| SessionError::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Drives one quiz: serializes commands and timer ticks onto a single queue,
/// applies them to the [`QuizSession`], and keeps the presenter and the tick
/// task in step with the result.
pub struct QuizRunner {
    clock: Clock,
    presenter: Arc<dyn Presenter>,
    session: QuizSession,
    timer: QuestionTimer,
    rng: StdRng,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
}

impl QuizRunner {
    /// Begin an attempt on `quiz` with an OS-seeded shuffle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Content` if the quiz has no questions.
    pub fn begin(
        quiz: Arc<Quiz>,
        settings: QuizSettings,
        clock: Clock,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, SessionError> {
        Self::begin_with_rng(quiz, settings, clock, presenter, StdRng::from_os_rng())
    }

    /// Begin an attempt with a caller-provided random source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Content` if the quiz has no questions.
    pub fn begin_with_rng(
        quiz: Arc<Quiz>,
        settings: QuizSettings,
        clock: Clock,
        presenter: Arc<dyn Presenter>,
        mut rng: StdRng,
    ) -> Result<Self, SessionError> {
        let session = QuizSession::begin(quiz, settings, &mut rng, clock.now())?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        Ok(Self {
            clock,
            presenter,
            session,
            timer: QuestionTimer::default(),
            rng,
            events_tx,
            events_rx,
        })
    }

    #[must_use]
    pub fn with_timer(mut self, timer: QuestionTimer) -> Self {
        self.timer = timer;
        self
    }

    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            events: self.events_tx.clone(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Process events until the player quits.
    ///
    /// Returns the results of the last completed attempt, if the player quit
    /// while looking at them.
    pub async fn run(mut self) -> Option<QuizResults> {
        self.render();
        self.sync_timer();

        while let Some(event) = self.events_rx.recv().await {
            if self.apply(event) == Flow::Stop {
                break;
            }
        }

        self.timer.stop();
        self.session.results().cloned()
    }

    fn apply(&mut self, event: SessionEvent) -> Flow {
        let now = self.clock.now();
        match event {
            SessionEvent::Tick(token) => match self.session.tick(token, now) {
                TickOutcome::Stale => {}
                TickOutcome::Running { .. } => self.render(),
                TickOutcome::Expired(transition) => self.after(transition),
            },
            SessionEvent::Command(SessionCommand::Quit) => {
                debug!(attempt = %self.session.attempt_id(), "player quit");
                self.timer.stop();
                self.presenter.session_closed();
                return Flow::Stop;
            }
            SessionEvent::Command(command) => match self.execute(command) {
                Ok(transition) => self.after(transition),
                Err(err) => {
                    debug!(?command, error = %err, "command rejected");
                    self.presenter.show_rejected(&err);
                }
            },
        }
        self.sync_timer();
        Flow::Continue
    }

    fn execute(&mut self, command: SessionCommand) -> Result<Transition, SessionError> {
        let now = self.clock.now();
        match command {
            SessionCommand::Select(display_index) => self.session.select_displayed(display_index),
            SessionCommand::SelectOriginal(index) => self.session.select_choice(index),
            SessionCommand::Submit => self.session.submit(now),
            SessionCommand::Previous => self.session.go_to_previous(now),
            SessionCommand::Next => self.session.go_to_next(now),
            SessionCommand::Restart => self.session.restart(&mut self.rng, now),
            SessionCommand::Quit => Ok(Transition::Ignored),
        }
    }

    fn after(&self, transition: Transition) {
        match transition {
            Transition::Ignored => {}
            Transition::Completed => {
                if let Some(results) = self.session.results() {
                    self.presenter.show_results(results);
                }
            }
            Transition::Selected { .. }
            | Transition::Advanced { .. }
            | Transition::Moved { .. }
            | Transition::Restarted => self.render(),
        }
    }

    fn render(&self) {
        if let Some(snapshot) = QuestionSnapshot::from_session(&self.session, self.clock.now()) {
            self.presenter.show_question(&snapshot);
        }
    }

    /// Keep exactly one tick task, matching the session's active countdown.
    fn sync_timer(&mut self) {
        match (self.session.active_timer(), self.timer.current()) {
            (Some(active), current) if current != Some(active) => {
                self.timer.start(active, self.events_tx.clone());
            }
            (None, Some(_)) => self.timer.stop(),
            _ => {}
        }
    }
}
