use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{
    Lesson, LessonId, Question, QuestionId, QuizId, QuizScore, UserId, UserProgress,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Document shape of a stored quiz question.
///
/// Field names follow the hosted document store (`question`, `correctAnswer`)
/// so exported quiz documents can be imported as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDocument {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuestionDocument {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id().to_string(),
            question: question.prompt().to_owned(),
            options: question.options().to_vec(),
            correct_answer: question.correct_answer().to_owned(),
        }
    }

    /// Convert the document into a domain `Question` without validating the
    /// answer against the options.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the id is blank.
    pub fn into_question(self) -> Result<Question, StorageError> {
        let id = QuestionId::new(self.id).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Question::from_persisted(
            id,
            self.question,
            self.options,
            self.correct_answer,
        ))
    }
}

/// Read side of quiz content.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Fetch the ordered questions of a quiz. An unknown quiz yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached or rows are corrupt.
    async fn get_questions(&self, quiz_id: &QuizId) -> Result<Vec<Question>, StorageError>;

    /// Insert or replace the question at `position` within a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(
        &self,
        quiz_id: &QuizId,
        position: u32,
        question: &Question,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Fetch a lesson by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a missing lesson is `Ok(None)`.
    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError>;

    /// Every lesson, ordered by display order and then id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures or corrupt rows.
    async fn list_lessons(&self) -> Result<Vec<Lesson>, StorageError>;

    /// Insert or replace a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;
}

/// Per-user progress record. Every write creates the record if it is absent
/// and refreshes its `last_updated` timestamp.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress record of a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a user with no record is `Ok(None)`.
    async fn get_user_progress(&self, user_id: &UserId)
    -> Result<Option<UserProgress>, StorageError>;

    /// Mark a lesson complete. Idempotent apart from `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert_lesson_completion(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Store the latest score for a quiz, overwriting any earlier score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert_quiz_score(
        &self,
        user_id: &UserId,
        quiz_id: &QuizId,
        score: QuizScore,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Overwrite the stored streak count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn set_streak(
        &self,
        user_id: &UserId,
        days: u32,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// `set_offline(true)` makes every call fail with `StorageError::Connection`,
/// which stands in for an unreachable document store.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<QuizId, Vec<(u32, Question)>>>>,
    lessons: Arc<Mutex<HashMap<LessonId, Lesson>>>,
    progress: Arc<Mutex<HashMap<UserId, UserProgress>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("store is offline".into()));
        }
        Ok(())
    }

    fn with_progress<F>(&self, user_id: &UserId, at: DateTime<Utc>, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut UserProgress),
    {
        self.ensure_online()?;
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard
            .entry(user_id.clone())
            .or_insert_with(|| UserProgress::new(user_id.clone(), at));
        f(record);
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn get_questions(&self, quiz_id: &QuizId) -> Result<Vec<Question>, StorageError> {
        self.ensure_online()?;
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let Some(rows) = guard.get(quiz_id) else {
            return Ok(Vec::new());
        };
        let mut rows = rows.clone();
        rows.sort_by_key(|(position, _)| *position);
        Ok(rows.into_iter().map(|(_, q)| q).collect())
    }

    async fn upsert_question(
        &self,
        quiz_id: &QuizId,
        position: u32,
        question: &Question,
    ) -> Result<(), StorageError> {
        self.ensure_online()?;
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let rows = guard.entry(quiz_id.clone()).or_default();
        rows.retain(|(p, q)| *p != position && q.id() != question.id());
        rows.push((position, question.clone()));
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError> {
        self.ensure_online()?;
        let guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_lessons(&self) -> Result<Vec<Lesson>, StorageError> {
        self.ensure_online()?;
        let guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut lessons: Vec<Lesson> = guard.values().cloned().collect();
        lessons.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));
        Ok(lessons)
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        self.ensure_online()?;
        let mut guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(lesson.id().clone(), lesson.clone());
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_user_progress(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProgress>, StorageError> {
        self.ensure_online()?;
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user_id).cloned())
    }

    async fn upsert_lesson_completion(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.with_progress(user_id, at, |p| p.mark_lesson_complete(lesson_id.clone(), at))
    }

    async fn upsert_quiz_score(
        &self,
        user_id: &UserId,
        quiz_id: &QuizId,
        score: QuizScore,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.with_progress(user_id, at, |p| p.record_quiz_score(quiz_id.clone(), score, at))
    }

    async fn set_streak(
        &self,
        user_id: &UserId,
        days: u32,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.with_progress(user_id, at, |p| p.set_streak_days(days, at))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryRepository::new())
    }

    /// Wrap an existing in-memory repository, keeping a handle for test setup.
    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let lessons: Arc<dyn LessonRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self {
            questions,
            lessons,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use course_core::time::fixed_now;

    fn quiz() -> QuizId {
        QuizId::new("js-basics").unwrap()
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn build_question(id: &str, answer: &str) -> Question {
        Question::new(
            QuestionId::new(id).unwrap(),
            format!("Prompt {id}"),
            vec!["a".into(), "b".into()],
            answer,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn questions_come_back_in_position_order() {
        let repo = InMemoryRepository::new();
        repo.upsert_question(&quiz(), 2, &build_question("c", "a")).await.unwrap();
        repo.upsert_question(&quiz(), 0, &build_question("a", "a")).await.unwrap();
        repo.upsert_question(&quiz(), 1, &build_question("b", "b")).await.unwrap();

        let ids: Vec<_> = repo
            .get_questions(&quiz())
            .await
            .unwrap()
            .iter()
            .map(|q| q.id().to_string())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unknown_quiz_is_empty_not_an_error() {
        let repo = InMemoryRepository::new();
        let questions = repo.get_questions(&quiz()).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn progress_is_created_lazily() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_user_progress(&user()).await.unwrap().is_none());

        let quiz_id = quiz();
        repo.upsert_quiz_score(&user(), &quiz_id, QuizScore::new(90).unwrap(), fixed_now())
            .await
            .unwrap();
        let later = fixed_now() + Duration::minutes(5);
        repo.upsert_quiz_score(&user(), &quiz_id, QuizScore::new(40).unwrap(), later)
            .await
            .unwrap();

        let progress = repo.get_user_progress(&user()).await.unwrap().unwrap();
        assert_eq!(progress.quiz_score(&quiz_id), Some(QuizScore::new(40).unwrap()));
        assert_eq!(progress.last_updated(), later);
    }

    #[tokio::test]
    async fn offline_repository_fails_every_call() {
        let repo = InMemoryRepository::new();
        repo.set_offline(true);
        assert!(matches!(
            repo.get_questions(&quiz()).await,
            Err(StorageError::Connection(_))
        ));
        assert!(matches!(
            repo.set_streak(&user(), 3, fixed_now()).await,
            Err(StorageError::Connection(_))
        ));

        repo.set_offline(false);
        assert!(repo.set_streak(&user(), 3, fixed_now()).await.is_ok());
    }

    fn build_lesson(id: &str, order: u32) -> Lesson {
        Lesson::new(
            LessonId::new(id).unwrap(),
            format!("Lesson {id}"),
            "",
            "https://example.com/video",
            order,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lessons_are_listed_by_order_then_id() {
        let repo = InMemoryRepository::new();
        for (id, order) in [("c", 2), ("b", 1), ("a", 2), ("z", 0)] {
            repo.upsert_lesson(&build_lesson(id, order)).await.unwrap();
        }

        let ids: Vec<_> = repo
            .list_lessons()
            .await
            .unwrap()
            .iter()
            .map(|l| l.id().to_string())
            .collect();
        assert_eq!(ids, ["z", "b", "a", "c"]);
    }

    #[test]
    fn question_document_uses_store_field_names() {
        let doc = QuestionDocument::from_question(&build_question("1", "b"));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["correctAnswer"], "b");
        assert_eq!(json["question"], "Prompt 1");

        let back = doc.into_question().unwrap();
        assert_eq!(back.correct_answer(), "b");
    }
}
