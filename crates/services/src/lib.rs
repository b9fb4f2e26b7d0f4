#![forbid(unsafe_code)]

pub mod error;
pub mod leaderboard;
pub mod presenter;
pub mod sessions;
pub mod timer;

pub use quiz_core::Clock;

pub use error::{LeaderboardError, PreconditionViolation, SessionError};
pub use leaderboard::{
    LeaderboardClient, LeaderboardConfig, ScoreSink, ScoreSubmission, SubmissionStatus,
    SubmitOutcome,
};
pub use presenter::Presenter;
pub use sessions::{
    QuestionSnapshot, QuizCatalog, QuizRunner, QuizSession, SessionCommand, SessionEvent,
    SessionHandle, SessionPhase, SessionProgress, TickOutcome, TimerToken, Transition,
};
pub use timer::QuestionTimer;
