use thiserror::Error;

use crate::model::{LessonError, ParseIdError, QuestionError, ScoreError};

/// Any domain validation failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}
