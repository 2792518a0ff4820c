use std::sync::Arc;

use chrono::{DateTime, Utc};
use course_core::model::{LessonId, QuizId, QuizScore, UserId};
use storage::repository::ProgressRepository;

use crate::Clock;
use crate::error::RecordingError;

/// Sole writer of user progress.
///
/// Writes are upserts: marking a lesson twice is the same as marking it once,
/// and a quiz score replaces the previous one. Failures are logged and
/// returned; nothing is retried or rolled back.
#[derive(Clone)]
pub struct CompletionRecorder {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl CompletionRecorder {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Mark a lesson complete for the user.
    ///
    /// Returns the timestamp written as `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns `RecordingError::RecordingFailed` if the store rejects the write.
    pub async fn mark_lesson_complete(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
    ) -> Result<DateTime<Utc>, RecordingError> {
        let at = self.clock.now();
        self.progress
            .upsert_lesson_completion(user_id, lesson_id, at)
            .await
            .map_err(|error| {
                tracing::warn!(%user_id, %lesson_id, %error, "failed to record lesson completion");
                RecordingError::RecordingFailed(error)
            })?;
        tracing::debug!(%user_id, %lesson_id, "lesson completion recorded");
        Ok(at)
    }

    /// Store the latest score for a quiz, overwriting any earlier one.
    ///
    /// Returns the timestamp written as `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns `RecordingError::RecordingFailed` if the store rejects the write.
    pub async fn record_quiz_score(
        &self,
        user_id: &UserId,
        quiz_id: &QuizId,
        score: QuizScore,
    ) -> Result<DateTime<Utc>, RecordingError> {
        let at = self.clock.now();
        self.progress
            .upsert_quiz_score(user_id, quiz_id, score, at)
            .await
            .map_err(|error| {
                tracing::warn!(%user_id, %quiz_id, %score, %error, "failed to record quiz score");
                RecordingError::RecordingFailed(error)
            })?;
        tracing::debug!(%user_id, %quiz_id, %score, "quiz score recorded");
        Ok(at)
    }
}
