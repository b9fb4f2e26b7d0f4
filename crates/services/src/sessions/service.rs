use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use quiz_core::model::{Answer, AttemptId, ContentError, Question, Quiz, QuizResults, QuizSettings};
use quiz_core::scoring::Scorer;
use quiz_core::shuffle::{DisplayedChoice, Permutation, displayed_choices, randomize_quiz};
use quiz_core::{Countdown, CountdownStatus};

use super::progress::SessionProgress;
use crate::error::{PreconditionViolation, SessionError};

//
// ─── STATES & OUTCOMES ─────────────────────────────────────────────────────────
//

/// Where an attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress { position: usize },
    Complete,
}

/// What a successful operation did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Selected { position: usize },
    Advanced { position: usize },
    Moved { position: usize },
    Restarted,
    Completed,
    /// Nothing changed (late expiry, stale timer).
    Ignored,
}

/// Identifies one run of the question timer.
///
/// The generation changes every time the timer is (re)started, so a tick
/// queued by a cancelled run never matches the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub attempt: AttemptId,
    pub generation: u64,
}

/// Result of feeding a timer tick into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Stale,
    Running { remaining_secs: u32 },
    Expired(Transition),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a quiz.
///
/// Owns the shuffled order, recorded answers and timings, and the lock state
/// of every presented question. All time comes in through `now` arguments so
/// the caller's clock stays the only source of truth.
pub struct QuizSession {
    quiz: Arc<Quiz>,
    settings: QuizSettings,
    scorer: Scorer,
    attempt: AttemptId,
    question_order: Permutation,
    choice_orders: Vec<Permutation>,
    answers: Vec<Answer>,
    times: Vec<u32>,
    submitted: BTreeSet<usize>,
    position: usize,
    countdown: Option<Countdown>,
    timer_generation: u64,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    results: Option<QuizResults>,
}

impl QuizSession {
    /// Start a fresh attempt: shuffle, reset records, and start the timer for
    /// the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Content` if the quiz has no questions.
    pub fn begin<R: Rng + ?Sized>(
        quiz: Arc<Quiz>,
        settings: QuizSettings,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let count = quiz.question_count();
        if count == 0 {
            return Err(ContentError::NoQuestions.into());
        }

        let (question_order, choice_orders) = randomize_quiz(quiz.questions(), rng);

        let mut session = Self {
            scorer: Scorer::new(&settings),
            quiz,
            settings,
            attempt: AttemptId::new_v4(),
            question_order,
            choice_orders,
            answers: vec![Answer::Unanswered; count],
            times: vec![0; count],
            submitted: BTreeSet::new(),
            position: 0,
            countdown: None,
            timer_generation: 0,
            started_at: now,
            completed_at: None,
            results: None,
        };
        session.start_timer(now);

        info!(
            quiz = %session.quiz.id(),
            attempt = %session.attempt,
            questions = count,
            "quiz attempt started"
        );
        Ok(session)
    }

    /// Throw this attempt away and begin a new one on the same quiz.
    ///
    /// The aggregate is replaced wholesale; nothing from the old attempt survives.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Content` if the quiz has no questions.
    pub fn restart<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Transition, SessionError> {
        let fresh = Self::begin(Arc::clone(&self.quiz), self.settings, rng, now)?;
        debug!(old = %self.attempt, new = %fresh.attempt, "quiz attempt restarted");
        *self = fresh;
        Ok(Transition::Restarted)
    }

    // ─── accessors ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn quiz(&self) -> &Arc<Quiz> {
        &self.quiz
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_complete() {
            SessionPhase::Complete
        } else {
            SessionPhase::InProgress {
                position: self.position,
            }
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.position + 1 == self.total_questions()
    }

    #[must_use]
    pub fn question_order(&self) -> &Permutation {
        &self.question_order
    }

    /// Choice order for the question presented at `position`.
    #[must_use]
    pub fn choice_order(&self, position: usize) -> Option<&Permutation> {
        self.choice_orders.get(position)
    }

    /// Recorded answers, indexed by presented position.
    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Recorded times in seconds, indexed by presented position.
    #[must_use]
    pub fn times(&self) -> &[u32] {
        &self.times
    }

    #[must_use]
    pub fn is_locked(&self, position: usize) -> bool {
        self.submitted.contains(&position)
    }

    #[must_use]
    pub fn submitted_count(&self) -> usize {
        self.submitted.len()
    }

    #[must_use]
    pub fn results(&self) -> Option<&QuizResults> {
        self.results.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.total_questions();
        SessionProgress {
            total,
            submitted: self.submitted_count(),
            remaining: total.saturating_sub(self.submitted_count()),
            is_complete: self.is_complete(),
        }
    }

    /// The question shown at `position`.
    #[must_use]
    pub fn presented_question(&self, position: usize) -> Option<&Question> {
        self.question_order
            .get(position)
            .and_then(|original| self.quiz.questions().get(original))
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.presented_question(self.position)
    }

    /// Choices of the current question in display order.
    #[must_use]
    pub fn current_choices(&self) -> Vec<DisplayedChoice> {
        match (self.current_question(), self.choice_orders.get(self.position)) {
            (Some(question), Some(order)) => displayed_choices(question, order),
            _ => Vec::new(),
        }
    }

    /// Token of the running question timer, if any.
    #[must_use]
    pub fn active_timer(&self) -> Option<TimerToken> {
        self.countdown
            .as_ref()
            .filter(|c| c.is_running())
            .map(|_| self.timer_token())
    }

    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        self.countdown
            .as_ref()
            .filter(|c| c.is_running())
            .map_or(0, |c| c.remaining_secs(now))
    }

    // ─── transitions ───────────────────────────────────────────────────────

    /// Record `original_index` as the answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns a `PreconditionViolation` if the session is complete, the
    /// question is locked, or the index is not one of its choices.
    pub fn select_choice(&mut self, original_index: usize) -> Result<Transition, SessionError> {
        let position = self.ensure_unlocked()?;
        let len = self
            .presented_question(position)
            .map_or(0, |q| q.choices().len());
        if original_index >= len {
            return Err(PreconditionViolation::ChoiceOutOfRange {
                index: original_index,
                len,
            }
            .into());
        }

        self.answers[position] = Answer::Choice(original_index);
        debug!(position, original_index, "choice selected");
        Ok(Transition::Selected { position })
    }

    /// Select by on-screen position instead of original index.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::select_choice`].
    pub fn select_displayed(&mut self, display_index: usize) -> Result<Transition, SessionError> {
        let position = self.ensure_unlocked()?;
        let order = self.choice_orders.get(position);
        let Some(original_index) = order.and_then(|o| o.get(display_index)) else {
            return Err(PreconditionViolation::ChoiceOutOfRange {
                index: display_index,
                len: order.map_or(0, Permutation::len),
            }
            .into());
        };
        self.select_choice(original_index)
    }

    /// Lock the current answer and move on (or complete on the last question).
    ///
    /// # Errors
    ///
    /// Returns a `PreconditionViolation` if the session is complete, the
    /// question is already locked, or nothing was selected.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<Transition, SessionError> {
        let position = self.ensure_unlocked()?;
        if self.answers[position].is_unanswered() {
            return Err(PreconditionViolation::NoAnswerSelected { position }.into());
        }
        Ok(self.lock_current(now))
    }

    /// Handle expiry of the timer identified by `token`.
    ///
    /// A late expiry (question already submitted, timer restarted, attempt
    /// replaced, or session complete) is absorbed and reported as `Ignored`.
    pub fn time_expired(&mut self, token: TimerToken, now: DateTime<Utc>) -> Transition {
        if self.is_complete() || token != self.timer_token() || self.is_locked(self.position) {
            debug!(?token, "ignoring late timer expiry");
            return Transition::Ignored;
        }

        if self.answers[self.position].is_unanswered() {
            self.answers[self.position] = Answer::TimedOut;
        }
        debug!(position = self.position, "question timed out");
        self.lock_current(now)
    }

    /// Feed a timer tick; triggers expiry when the countdown reaches zero.
    pub fn tick(&mut self, token: TimerToken, now: DateTime<Utc>) -> TickOutcome {
        if token != self.timer_token() {
            return TickOutcome::Stale;
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return TickOutcome::Stale;
        };
        match countdown.poll(now) {
            CountdownStatus::Running { remaining_secs } => TickOutcome::Running { remaining_secs },
            CountdownStatus::Expired => TickOutcome::Expired(self.time_expired(token, now)),
            CountdownStatus::Stopped => TickOutcome::Stale,
        }
    }

    /// Step back one question without touching recorded answers.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionViolation::NavigationDisabled` unless the settings
    /// allow navigation, and `NavigationOutOfBounds` on the first question.
    pub fn go_to_previous(&mut self, now: DateTime<Utc>) -> Result<Transition, SessionError> {
        self.ensure_navigable()?;
        if self.position == 0 {
            return Err(PreconditionViolation::NavigationOutOfBounds {
                position: self.position,
            }
            .into());
        }
        Ok(self.move_to(self.position - 1, now))
    }

    /// Step forward one question without touching recorded answers.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionViolation::NavigationDisabled` unless the settings
    /// allow navigation, and `NavigationOutOfBounds` on the last question.
    pub fn go_to_next(&mut self, now: DateTime<Utc>) -> Result<Transition, SessionError> {
        self.ensure_navigable()?;
        if self.is_last() {
            return Err(PreconditionViolation::NavigationOutOfBounds {
                position: self.position,
            }
            .into());
        }
        Ok(self.move_to(self.position + 1, now))
    }

    // ─── internals ─────────────────────────────────────────────────────────

    fn timer_token(&self) -> TimerToken {
        TimerToken {
            attempt: self.attempt,
            generation: self.timer_generation,
        }
    }

    fn ensure_unlocked(&self) -> Result<usize, PreconditionViolation> {
        if self.is_complete() {
            return Err(PreconditionViolation::SessionComplete);
        }
        if self.is_locked(self.position) {
            return Err(PreconditionViolation::QuestionLocked {
                position: self.position,
            });
        }
        Ok(self.position)
    }

    fn ensure_navigable(&self) -> Result<(), PreconditionViolation> {
        if !self.settings.allow_navigation() {
            return Err(PreconditionViolation::NavigationDisabled);
        }
        if self.is_complete() {
            return Err(PreconditionViolation::SessionComplete);
        }
        Ok(())
    }

    fn start_timer(&mut self, now: DateTime<Utc>) {
        self.timer_generation += 1;
        self.countdown = Some(Countdown::start(
            now,
            self.settings.max_time_per_question_secs(),
        ));
    }

    fn stop_timer(&mut self, now: DateTime<Utc>) -> u32 {
        let elapsed = match self.countdown.as_mut() {
            Some(countdown) => {
                countdown.stop(now);
                countdown.elapsed_secs(now)
            }
            None => 0,
        };
        self.countdown = None;
        elapsed
    }

    /// Stop the timer and add its elapsed time to the current question.
    ///
    /// Visits accumulate, so leaving a question and coming back never resets
    /// the time it is scored on. The total is capped at the limit.
    fn record_time(&mut self, now: DateTime<Utc>) {
        let elapsed = self.stop_timer(now);
        let limit = self.settings.max_time_per_question_secs();
        let slot = &mut self.times[self.position];
        *slot = slot.saturating_add(elapsed).min(limit);
    }

    fn move_to(&mut self, position: usize, now: DateTime<Utc>) -> Transition {
        if !self.is_locked(self.position) {
            self.record_time(now);
        } else {
            self.stop_timer(now);
        }
        self.position = position;
        if !self.is_locked(position) {
            self.start_timer(now);
        }
        debug!(position, "moved to question");
        Transition::Moved { position }
    }

    fn lock_current(&mut self, now: DateTime<Utc>) -> Transition {
        let position = self.position;
        self.record_time(now);
        self.submitted.insert(position);
        debug!(
            position,
            answer = ?self.answers[position],
            elapsed_secs = self.times[position],
            "question locked"
        );

        if self.is_last() {
            self.complete(now);
            return Transition::Completed;
        }

        self.position += 1;
        if !self.is_locked(self.position) {
            self.start_timer(now);
        }
        Transition::Advanced {
            position: self.position,
        }
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        let results = self.scorer.finalize(
            &self.quiz,
            &self.question_order,
            &self.answers,
            &self.times,
        );
        info!(
            quiz = %self.quiz.id(),
            attempt = %self.attempt,
            total = results.total_score,
            max = results.max_possible_score,
            "quiz attempt completed"
        );
        self.results = Some(results);
        self.completed_at = Some(now);
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", self.quiz.id())
            .field("attempt", &self.attempt)
            .field("questions_len", &self.answers.len())
            .field("position", &self.position)
            .field("submitted_len", &self.submitted.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
