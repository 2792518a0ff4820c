use std::sync::Arc;

use course_core::model::{QuizId, QuizScore, UserId};
use storage::repository::QuestionRepository;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::session::{AdvanceOutcome, QuizSession};
use crate::completion_recorder::CompletionRecorder;
use crate::error::{QuizError, RecordingError};
use crate::fallback::DefaultContentFallback;

/// Background write of a submitted score.
///
/// The session is already `Submitted` when this exists; awaiting it only tells
/// the caller whether the store accepted the score. Dropping it detaches the
/// write.
#[derive(Debug)]
pub struct RecordingHandle {
    task: Option<JoinHandle<Result<(), RecordingError>>>,
}

impl RecordingHandle {
    /// Wait for the write to finish.
    ///
    /// # Errors
    ///
    /// Returns the recorder's error, or `RecordingError::Aborted` if the task
    /// panicked, was cancelled, or could not be spawned.
    pub async fn wait(self) -> Result<(), RecordingError> {
        match self.task {
            Some(task) => task.await.map_err(|_| RecordingError::Aborted)?,
            None => Err(RecordingError::Aborted),
        }
    }
}

/// Result of advancing a quiz through `QuizLoopService`.
#[derive(Debug)]
pub struct QuizStep {
    pub outcome: AdvanceOutcome,
    /// Present only when this step submitted the quiz for a signed-in user.
    pub recording: Option<RecordingHandle>,
}

/// Loads quizzes and hands finished attempts to the completion recorder.
#[derive(Clone)]
pub struct QuizLoopService {
    questions: Arc<dyn QuestionRepository>,
    recorder: CompletionRecorder,
    fallback: DefaultContentFallback,
    strict_options: bool,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>, recorder: CompletionRecorder) -> Self {
        Self {
            questions,
            recorder,
            fallback: DefaultContentFallback::default(),
            strict_options: false,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: DefaultContentFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sessions started by this service reject answers that are not options.
    #[must_use]
    pub fn with_strict_options(mut self, strict: bool) -> Self {
        self.strict_options = strict;
        self
    }

    /// Load a quiz into a fresh session.
    ///
    /// # Errors
    ///
    /// Only with `DefaultContentFallback::Propagate`: `QuizError::NotFound` for
    /// a quiz without questions and `QuizError::Storage` when the fetch fails.
    pub async fn load(&self, quiz_id: &QuizId) -> Result<QuizSession, QuizError> {
        let fetched = self.questions.get_questions(quiz_id).await;
        let (questions, source) = self.fallback.resolve_questions(quiz_id, fetched)?;
        Ok(QuizSession::new(quiz_id.clone(), questions, source)?
            .with_strict_options(self.strict_options))
    }

    /// Advance the session; on submission start recording the score.
    ///
    /// The session transition never waits on storage. Guests (`user_id` is
    /// `None`) get a score but nothing is recorded.
    pub fn advance(&self, session: &mut QuizSession, user_id: Option<&UserId>) -> QuizStep {
        let outcome = session.advance();
        let recording = match (outcome.newly_submitted(), user_id) {
            (Some(score), Some(user_id)) => {
                Some(self.record_in_background(user_id.clone(), session.quiz_id().clone(), score))
            }
            _ => None,
        };
        QuizStep { outcome, recording }
    }

    fn record_in_background(
        &self,
        user_id: UserId,
        quiz_id: QuizId,
        score: QuizScore,
    ) -> RecordingHandle {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(%user_id, %quiz_id, %score, "no async runtime; quiz score not recorded");
            return RecordingHandle { task: None };
        };
        let recorder = self.recorder.clone();
        let task = runtime.spawn(async move {
            recorder
                .record_quiz_score(&user_id, &quiz_id, score)
                .await
                .map(|_| ())
        });
        RecordingHandle { task: Some(task) }
    }
}
