//! Directory-backed quiz source.
//!
//! The directory holds a `manifest.yaml` listing quiz files:
//!
//! ```yaml
//! quizzes:
//!   - filename: rust-basics.yaml
//!     order: 1
//!   - filename: geography.yaml
//! ```
//!
//! and one YAML file per quiz with `title`, `description` and `questions`
//! (`topic`, `question`, `choices`, `correct`).

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use quiz_core::model::{Quiz, QuizDraft, QuizId};

use crate::repository::{QuizSource, SourceError};

pub const MANIFEST_FILE: &str = "manifest.yaml";

#[derive(Debug, Deserialize)]
struct Manifest {
    quizzes: Option<Vec<ManifestEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestEntry {
    filename: String,
    #[serde(default)]
    order: i64,
}

/// Loads quizzes listed in a manifest file.
///
/// Files that are missing or fail validation are skipped with a warning; the
/// load only fails when the manifest itself is unusable or nothing valid remains.
#[derive(Debug, Clone)]
pub struct ManifestQuizSource {
    root: PathBuf,
}

impl ManifestQuizSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read(&self, path: &Path) -> Result<String, SourceError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.display().to_string(),
                source,
            })
    }

    async fn load_manifest(&self) -> Result<Vec<ManifestEntry>, SourceError> {
        let path = self.root.join(MANIFEST_FILE);
        let raw = self.read(&path).await?;
        let manifest: Manifest =
            serde_yaml::from_str(&raw).map_err(|e| SourceError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let mut entries = manifest
            .quizzes
            .ok_or_else(|| SourceError::InvalidManifest("missing `quizzes` list".into()))?;
        // Stable sort keeps manifest order for equal keys.
        entries.sort_by_key(|e| e.order);
        Ok(entries)
    }

    async fn load_quiz(&self, entry: &ManifestEntry) -> Result<Quiz, SourceError> {
        let path = self.root.join(&entry.filename);
        let raw = self.read(&path).await?;
        let draft: QuizDraft = serde_yaml::from_str(&raw).map_err(|e| SourceError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let quiz = Quiz::from_draft(QuizId::new(entry.filename.clone()), draft)?;
        Ok(quiz.with_order(entry.order))
    }
}

#[async_trait]
impl QuizSource for ManifestQuizSource {
    async fn load_all(&self) -> Result<Vec<Quiz>, SourceError> {
        let entries = self.load_manifest().await?;

        let mut quizzes = Vec::with_capacity(entries.len());
        for entry in &entries {
            match self.load_quiz(entry).await {
                Ok(quiz) => {
                    debug!(filename = %entry.filename, questions = quiz.question_count(), "loaded quiz");
                    quizzes.push(quiz);
                }
                Err(err) => warn!(filename = %entry.filename, error = %err, "skipping quiz file"),
            }
        }

        if quizzes.is_empty() {
            return Err(SourceError::NoQuizzes);
        }
        Ok(quizzes)
    }
}
