#![forbid(unsafe_code)]

pub mod app_services;
pub mod completion_recorder;
pub mod error;
pub mod fallback;
pub mod lesson_service;
pub mod progress_service;
pub mod quiz;

pub use course_core::Clock;

pub use app_services::{AppOptions, AppServices};
pub use completion_recorder::CompletionRecorder;
pub use error::{AppServicesError, LessonServiceError, ProgressError, QuizError, RecordingError};
pub use fallback::{ContentSource, DefaultContentFallback};
pub use lesson_service::{LessonCatalogue, LessonService, LoadedLesson};
pub use progress_service::{DEFAULT_TOTAL_COURSES, ProfileOverview, ProgressService};
pub use quiz::{
    AdvanceOutcome, QuizLoopService, QuizPhase, QuizPosition, QuizSession, QuizStep,
    RecordingHandle,
};
