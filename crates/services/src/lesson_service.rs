use std::sync::Arc;

use course_core::model::{Lesson, LessonId};
use storage::repository::LessonRepository;

use crate::error::LessonServiceError;
use crate::fallback::{ContentSource, DefaultContentFallback};

/// A lesson ready for display, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLesson {
    pub lesson: Lesson,
    pub source: ContentSource,
}

/// Lessons in display order, with where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCatalogue {
    pub lessons: Vec<Lesson>,
    pub source: ContentSource,
}

impl LessonCatalogue {
    /// Number of courses a learner can complete.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Lessons tagged with `level`; `None` keeps every lesson.
    pub fn filter_level<'a>(&'a self, level: Option<&'a str>) -> impl Iterator<Item = &'a Lesson> {
        self.lessons
            .iter()
            .filter(move |lesson| level.is_none_or(|wanted| lesson.level() == Some(wanted)))
    }
}

#[derive(Clone)]
pub struct LessonService {
    lessons: Arc<dyn LessonRepository>,
    fallback: DefaultContentFallback,
}

impl LessonService {
    #[must_use]
    pub fn new(lessons: Arc<dyn LessonRepository>) -> Self {
        Self {
            lessons,
            fallback: DefaultContentFallback::default(),
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: DefaultContentFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Load a lesson, substituting sample content per the fallback strategy.
    ///
    /// # Errors
    ///
    /// Only with `DefaultContentFallback::Propagate`.
    pub async fn load(&self, lesson_id: &LessonId) -> Result<LoadedLesson, LessonServiceError> {
        let fetched = self.lessons.get_lesson(lesson_id).await;
        let (lesson, source) = self.fallback.resolve_lesson(lesson_id, fetched)?;
        Ok(LoadedLesson { lesson, source })
    }

    /// List every lesson in display order.
    ///
    /// # Errors
    ///
    /// Only with `DefaultContentFallback::Propagate`, when the fetch fails.
    pub async fn catalogue(&self) -> Result<LessonCatalogue, LessonServiceError> {
        let fetched = self.lessons.list_lessons().await;
        let (lessons, source) = self.fallback.resolve_catalogue(fetched)?;
        Ok(LessonCatalogue { lessons, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn stored_lesson_is_returned() {
        let repo = InMemoryRepository::new();
        let id = LessonId::new("7").unwrap();
        let lesson = Lesson::new(id.clone(), "CSS Grid", "", "https://example.com/v", 7, None).unwrap();
        repo.upsert_lesson(&lesson).await.unwrap();

        let loaded = LessonService::new(Arc::new(repo)).load(&id).await.unwrap();
        assert_eq!(loaded.lesson, lesson);
        assert_eq!(loaded.source, ContentSource::Stored);
    }

    fn lesson(id: &str, order: u32, level: Option<&str>) -> Lesson {
        Lesson::new(
            LessonId::new(id).unwrap(),
            format!("Lesson {id}"),
            "",
            "https://example.com/v",
            order,
            None,
        )
        .unwrap()
        .with_level(level.map(str::to_owned))
    }

    #[tokio::test]
    async fn catalogue_is_sorted_and_filterable_by_level() {
        let repo = InMemoryRepository::new();
        repo.upsert_lesson(&lesson("b", 2, Some("beginner"))).await.unwrap();
        repo.upsert_lesson(&lesson("c", 3, Some("advanced"))).await.unwrap();
        repo.upsert_lesson(&lesson("a", 1, Some("beginner"))).await.unwrap();

        let catalogue = LessonService::new(Arc::new(repo)).catalogue().await.unwrap();
        assert_eq!(catalogue.source, ContentSource::Stored);
        let all: Vec<_> = catalogue.filter_level(None).map(|l| l.id().as_str()).collect();
        assert_eq!(all, ["a", "b", "c"]);
        let beginner: Vec<_> = catalogue
            .filter_level(Some("beginner"))
            .map(|l| l.id().as_str())
            .collect();
        assert_eq!(beginner, ["a", "b"]);
        assert_eq!(catalogue.filter_level(Some("expert")).count(), 0);
    }

    #[tokio::test]
    async fn unreachable_catalogue_lists_six_sample_lessons() {
        let repo = InMemoryRepository::new();
        repo.set_offline(true);
        let svc = LessonService::new(Arc::new(repo));

        let catalogue = svc.catalogue().await.unwrap();
        assert_eq!(catalogue.len(), 6);
        assert_eq!(catalogue.source, ContentSource::OfflineFallback);

        let err = svc
            .with_fallback(DefaultContentFallback::Propagate)
            .catalogue()
            .await
            .unwrap_err();
        assert!(matches!(err, LessonServiceError::Storage(_)));
    }

    #[tokio::test]
    async fn missing_lesson_uses_sample_or_errors() {
        let repo = InMemoryRepository::new();
        let id = LessonId::new("7").unwrap();
        let svc = LessonService::new(Arc::new(repo));

        let loaded = svc.load(&id).await.unwrap();
        assert_eq!(loaded.source, ContentSource::SampleFallback);
        assert_eq!(loaded.lesson.id(), &id);

        let err = svc
            .with_fallback(DefaultContentFallback::Propagate)
            .load(&id)
            .await
            .unwrap_err();
        assert!(matches!(err, LessonServiceError::NotFound { .. }));
    }
}
