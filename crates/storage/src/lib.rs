#![forbid(unsafe_code)]

pub mod manifest;
pub mod repository;

pub use manifest::ManifestQuizSource;
pub use repository::{InMemoryQuizSource, QuizSource, SourceError};
