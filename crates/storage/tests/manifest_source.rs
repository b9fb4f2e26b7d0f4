use std::ops::Deref;
use std::path::{Path, PathBuf};

use storage::{ManifestQuizSource, QuizSource, SourceError};

/// Temporary data directory, removed when the test ends (pass or fail).
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn path(&self) -> &Path {
        &self.0
    }
}

impl Deref for ScratchDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn scratch_dir() -> ScratchDir {
    let dir = std::env::temp_dir().join(format!("quiz-manifest-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    ScratchDir(dir)
}

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

const RUST_QUIZ: &str = r#"
title: Rust Basics
description: Ownership and borrowing
questions:
  - topic: Ownership
    question: Which type owns heap data?
    choices: ["&str", "String"]
    correct: 1
  - topic: Borrowing
    question: How many mutable borrows may coexist?
    choices: ["one", "many"]
    correct: 0
"#;

const GEO_QUIZ: &str = r#"
title: Geography
description: Capitals
questions:
  - topic: Europe
    question: Capital of Portugal?
    choices: ["Porto", "Lisbon"]
    correct: 1
"#;

#[tokio::test]
async fn loads_quizzes_in_manifest_order() {
    let dir = scratch_dir();
    write(
        &dir,
        "manifest.yaml",
        "quizzes:\n  - filename: rust.yaml\n    order: 2\n  - filename: geo.yaml\n    order: 1\n",
    );
    write(&dir, "rust.yaml", RUST_QUIZ);
    write(&dir, "geo.yaml", GEO_QUIZ);

    let quizzes = ManifestQuizSource::new(dir.path()).load_all().await.unwrap();

    let titles: Vec<_> = quizzes.iter().map(|q| q.title()).collect();
    assert_eq!(titles, vec!["Geography", "Rust Basics"]);
    assert_eq!(quizzes[1].id().as_str(), "rust.yaml");
    assert_eq!(quizzes[1].questions()[0].correct_choice(), "String");
}

#[tokio::test]
async fn skips_missing_and_invalid_files() {
    let dir = scratch_dir();
    write(
        &dir,
        "manifest.yaml",
        "quizzes:\n  - filename: missing.yaml\n  - filename: broken.yaml\n  - filename: geo.yaml\n",
    );
    write(
        &dir,
        "broken.yaml",
        "title: Broken\nquestions:\n  - topic: T\n    question: Q\n    choices: []\n    correct: 0\n",
    );
    write(&dir, "geo.yaml", GEO_QUIZ);

    let quizzes = ManifestQuizSource::new(dir.path()).load_all().await.unwrap();
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].title(), "Geography");
}

#[tokio::test]
async fn no_valid_quiz_is_an_error() {
    let dir = scratch_dir();
    write(&dir, "manifest.yaml", "quizzes:\n  - filename: missing.yaml\n");

    let err = ManifestQuizSource::new(dir.path()).load_all().await.unwrap_err();
    assert!(matches!(err, SourceError::NoQuizzes));
}

#[tokio::test]
async fn manifest_without_quiz_list_is_invalid() {
    let dir = scratch_dir();
    write(&dir, "manifest.yaml", "title: nope\n");

    let err = ManifestQuizSource::new(dir.path()).load_all().await.unwrap_err();
    assert!(matches!(err, SourceError::InvalidManifest(_)));
}

#[tokio::test]
async fn missing_manifest_is_an_io_error() {
    let dir = scratch_dir();
    let err = ManifestQuizSource::new(dir.path()).load_all().await.unwrap_err();
    assert!(matches!(err, SourceError::Io { .. }));
}

#[tokio::test]
async fn scratch_dir_is_removed_on_drop() {
    let dir = scratch_dir();
    write(&dir, "manifest.yaml", "quizzes: []\n");
    let path = dir.path().to_path_buf();
    assert!(path.exists());

    drop(dir);
    assert!(!path.exists());
}
