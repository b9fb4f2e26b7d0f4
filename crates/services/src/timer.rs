//! Repeating tick task for the active question.
//!
//! The task only says "tick"; whether the countdown has expired is decided by
//! the session from its own anchored `Countdown`, so a late or dropped tick
//! can never skew the result.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use crate::sessions::TimerToken;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns at most one running tick task.
#[derive(Debug)]
pub struct QuestionTimer {
    period: Duration,
    running: Option<(TimerToken, JoinHandle<()>)>,
}

impl Default for QuestionTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl QuestionTimer {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            running: None,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<TimerToken> {
        self.running.as_ref().map(|(token, _)| *token)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start ticking for `token`, cancelling any previous run.
    ///
    /// Each tick sends `E::from(token)` on `events`; the task ends on its own
    /// once the receiver is gone. Must be called inside a tokio runtime.
    pub fn start<E>(&mut self, token: TimerToken, events: mpsc::Sender<E>)
    where
        E: From<TimerToken> + Send + 'static,
    {
        self.stop();
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the caller already rendered that state.
            interval.tick().await;
            loop {
                interval.tick().await;
                trace!(generation = token.generation, "timer tick");
                if events.send(E::from(token)).await.is_err() {
                    break;
                }
            }
        });
        self.running = Some((token, handle));
    }

    /// Cancel the running task, if any. Ticks already queued stay queued and
    /// are recognised as stale by their token.
    pub fn stop(&mut self) {
        if let Some((_, handle)) = self.running.take() {
            handle.abort();
        }
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AttemptId;

    fn token(generation: u64) -> TimerToken {
        TimerToken {
            attempt: AttemptId::new_v4(),
            generation,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (tx, mut rx) = mpsc::channel::<TimerToken>(16);
        let mut timer = QuestionTimer::default();
        let t = token(1);
        timer.start(t, tx);

        for _ in 0..3 {
            let got = rx.recv().await.unwrap();
            assert_eq!(got, t);
        }
        assert_eq!(timer.current(), Some(t));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_previous_run() {
        let (tx, mut rx) = mpsc::channel::<TimerToken>(16);
        let mut timer = QuestionTimer::default();
        let first = token(1);
        let second = token(2);

        timer.start(first, tx.clone());
        timer.start(second, tx);

        for _ in 0..3 {
            assert_eq!(rx.recv().await.unwrap(), second);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_ticking() {
        let (tx, mut rx) = mpsc::channel::<TimerToken>(16);
        let mut timer = QuestionTimer::default();
        timer.start(token(1), tx);
        rx.recv().await.unwrap();

        timer.stop();
        assert!(!timer.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        // Every sender is gone once the task is aborted.
        assert!(rx.recv().await.is_none());
    }
}
