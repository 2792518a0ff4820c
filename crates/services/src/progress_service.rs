use std::sync::Arc;

use course_core::model::{
    CourseCompletion, LessonId, ProgressSummary, UserId, UserProgress, compute_summary,
};
use storage::repository::ProgressRepository;

use crate::error::ProgressError;
use crate::lesson_service::LessonService;

/// Course count used when no catalogue is attached; the size of the sample
/// catalogue.
pub const DEFAULT_TOTAL_COURSES: usize = 6;

/// Everything the profile dashboard shows for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOverview {
    pub summary: ProgressSummary,
    pub completion: CourseCompletion,
    /// Sorted lesson ids.
    pub completed_lessons: Vec<LessonId>,
}

/// Read-only view over stored progress. Results are computed on every call.
#[derive(Clone)]
pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
    total_courses: usize,
    catalogue: Option<Arc<LessonService>>,
}

impl ProgressService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            progress,
            total_courses: DEFAULT_TOTAL_COURSES,
            catalogue: None,
        }
    }

    #[must_use]
    pub fn with_total_courses(mut self, total_courses: usize) -> Self {
        self.total_courses = total_courses;
        self
    }

    /// Measure course completion against the lesson catalogue instead of a
    /// fixed count.
    #[must_use]
    pub fn with_catalogue(mut self, lessons: Arc<LessonService>) -> Self {
        self.catalogue = Some(lessons);
        self
    }

    /// Summary statistics; all zero for a user with no record yet.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read.
    pub async fn summary(&self, user_id: &UserId) -> Result<ProgressSummary, ProgressError> {
        let progress = self.progress.get_user_progress(user_id).await?;
        Ok(progress.as_ref().map(compute_summary).unwrap_or_default())
    }

    /// Summary, course completion and the completed lesson list.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read, and
    /// `ProgressError::Catalogue` if an attached catalogue fails to load.
    pub async fn profile(&self, user_id: &UserId) -> Result<ProfileOverview, ProgressError> {
        let progress = self.progress.get_user_progress(user_id).await?;
        let total_courses = match &self.catalogue {
            Some(lessons) => lessons.catalogue().await?.len(),
            None => self.total_courses,
        };
        Ok(Self::overview(progress.as_ref(), total_courses))
    }

    fn overview(progress: Option<&UserProgress>, total_courses: usize) -> ProfileOverview {
        let summary = progress.map(compute_summary).unwrap_or_default();
        let completed_lessons = progress
            .map(|p| p.completed_lessons().keys().cloned().collect())
            .unwrap_or_default();
        ProfileOverview {
            summary,
            completion: summary.course_completion(total_courses),
            completed_lessons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{Lesson, QuizId, QuizScore};
    use course_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, LessonRepository};

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[tokio::test]
    async fn unknown_user_has_zero_summary() {
        let repo = InMemoryRepository::new();
        let svc = ProgressService::new(Arc::new(repo));
        let summary = svc.summary(&user()).await.unwrap();
        assert_eq!(summary.completed_lesson_count, 0);
        assert_eq!(summary.average_quiz_score, 0);
        assert_eq!(summary.streak_days, 0);
    }

    #[tokio::test]
    async fn profile_lists_lessons_and_completion() {
        let repo = InMemoryRepository::new();
        for lesson in ["2", "1", "3"] {
            repo.upsert_lesson_completion(&user(), &LessonId::new(lesson).unwrap(), fixed_now())
                .await
                .unwrap();
        }
        repo.upsert_quiz_score(&user(), &QuizId::new("q1").unwrap(), QuizScore::new(80).unwrap(), fixed_now())
            .await
            .unwrap();
        repo.upsert_quiz_score(&user(), &QuizId::new("q2").unwrap(), QuizScore::new(60).unwrap(), fixed_now())
            .await
            .unwrap();

        let svc = ProgressService::new(Arc::new(repo));
        let profile = svc.profile(&user()).await.unwrap();

        let ids: Vec<_> = profile.completed_lessons.iter().map(LessonId::as_str).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(profile.summary.average_quiz_score, 70);
        assert_eq!(profile.completion.completed, 3);
        assert_eq!(profile.completion.total, DEFAULT_TOTAL_COURSES);
        assert_eq!(profile.completion.percent, 50);
    }

    fn lesson(id: &str, order: u32) -> Lesson {
        Lesson::new(
            LessonId::new(id).unwrap(),
            format!("Lesson {id}"),
            "",
            "https://example.com/v",
            order,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn completion_is_measured_against_the_catalogue() {
        let repo = InMemoryRepository::new();
        for (id, order) in [("1", 1), ("2", 2), ("3", 3), ("4", 4)] {
            repo.upsert_lesson(&lesson(id, order)).await.unwrap();
        }
        repo.upsert_lesson_completion(&user(), &LessonId::new("1").unwrap(), fixed_now())
            .await
            .unwrap();

        let lessons = Arc::new(LessonService::new(Arc::new(repo.clone())));
        let svc = ProgressService::new(Arc::new(repo)).with_catalogue(lessons);
        let profile = svc.profile(&user()).await.unwrap();

        assert_eq!(profile.completion.total, 4);
        assert_eq!(profile.completion.percent, 25);
    }

    #[tokio::test]
    async fn empty_store_measures_against_sample_catalogue() {
        let repo = InMemoryRepository::new();
        let lessons = Arc::new(LessonService::new(Arc::new(repo.clone())));
        let svc = ProgressService::new(Arc::new(repo)).with_catalogue(lessons);

        let profile = svc.profile(&user()).await.unwrap();
        assert_eq!(profile.completion.total, DEFAULT_TOTAL_COURSES);
        assert_eq!(crate::fallback::sample_catalogue().len(), DEFAULT_TOTAL_COURSES);
    }

    #[tokio::test]
    async fn read_failure_is_reported() {
        let repo = InMemoryRepository::new();
        repo.set_offline(true);
        let svc = ProgressService::new(Arc::new(repo)).with_total_courses(10);
        assert!(matches!(
            svc.summary(&user()).await,
            Err(ProgressError::Storage(_))
        ));
    }
}
