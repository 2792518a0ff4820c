use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::completion_recorder::CompletionRecorder;
use crate::error::AppServicesError;
use crate::fallback::DefaultContentFallback;
use crate::lesson_service::LessonService;
use crate::progress_service::ProgressService;
use crate::quiz::QuizLoopService;

/// Knobs the binaries expose on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppOptions {
    pub fallback: DefaultContentFallback,
    pub strict_options: bool,
}

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    recorder: Arc<CompletionRecorder>,
    progress: Arc<ProgressService>,
    lessons: Arc<LessonService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        options: AppOptions,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, options))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, options: AppOptions) -> Self {
        let recorder = CompletionRecorder::new(clock, Arc::clone(&storage.progress));
        let quiz_loop = QuizLoopService::new(Arc::clone(&storage.questions), recorder.clone())
            .with_fallback(options.fallback)
            .with_strict_options(options.strict_options);
        let lessons = Arc::new(
            LessonService::new(Arc::clone(&storage.lessons)).with_fallback(options.fallback),
        );
        let progress =
            ProgressService::new(Arc::clone(&storage.progress)).with_catalogue(Arc::clone(&lessons));

        Self {
            quiz_loop: Arc::new(quiz_loop),
            recorder: Arc::new(recorder),
            progress: Arc::new(progress),
            lessons,
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn recorder(&self) -> Arc<CompletionRecorder> {
        Arc::clone(&self.recorder)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }
}
