//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{LessonId, QuizId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz session and `QuizLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions found for quiz {quiz_id}")]
    NotFound { quiz_id: QuizId },
    #[error("quiz already submitted")]
    Submitted,
    #[error("quiz has not been submitted yet")]
    NotSubmitted,
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("{option:?} is not one of the question's options")]
    InvalidOption { option: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CompletionRecorder`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordingError {
    #[error("recording failed: {0}")]
    RecordingFailed(#[source] StorageError),
    #[error("recording task did not complete")]
    Aborted,
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("course catalogue unavailable: {0}")]
    Catalogue(#[from] LessonServiceError),
}

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("lesson {lesson_id} not found")]
    NotFound { lesson_id: LessonId },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
