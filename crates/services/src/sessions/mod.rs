mod catalog;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use catalog::QuizCatalog;
pub use progress::SessionProgress;
pub use service::{QuizSession, SessionPhase, TickOutcome, TimerToken, Transition};
pub use view::QuestionSnapshot;
pub use workflow::{QuizRunner, SessionCommand, SessionEvent, SessionHandle};
