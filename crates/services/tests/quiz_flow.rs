use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{
    LessonId, Question, QuestionId, QuizId, QuizScore, UserId, UserProgress,
};
use course_core::time::fixed_clock;
use services::{
    AppOptions, AppServices, CompletionRecorder, ContentSource, DefaultContentFallback,
    QuizError, QuizLoopService, QuizPhase,
};
use storage::repository::{
    InMemoryRepository, ProgressRepository, QuestionRepository, Storage, StorageError,
};
use tokio::sync::Notify;

fn build_question(id: &str, correct: &str) -> Question {
    Question::new(
        QuestionId::new(id).unwrap(),
        format!("Question {id}"),
        vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct,
    )
    .unwrap()
}

async fn seed_quiz(repo: &InMemoryRepository, quiz_id: &QuizId, answers: &[&str]) {
    for (position, (idx, correct)) in (0_u32..).zip(answers.iter().enumerate()) {
        repo.upsert_question(quiz_id, position, &build_question(&idx.to_string(), correct))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn quiz_attempt_is_scored_recorded_and_summarized() {
    let repo = InMemoryRepository::new();
    let quiz_id = QuizId::new("js-basics").unwrap();
    seed_quiz(&repo, &quiz_id, &["a", "b", "c", "d"]).await;

    let app = AppServices::from_storage(
        &Storage::from_in_memory(repo.clone()),
        fixed_clock(),
        AppOptions::default(),
    );
    let quiz_loop = app.quiz_loop();
    let user = UserId::new("u1").unwrap();

    let mut session = quiz_loop.load(&quiz_id).await.unwrap();
    assert_eq!(session.source(), ContentSource::Stored);

    // Correct on questions 1 and 3 only.
    let mut recording = None;
    for pick in ["a", "a", "c", "a"] {
        session.select_answer(pick).unwrap();
        let step = quiz_loop.advance(&mut session, Some(&user));
        recording = step.recording.or(recording);
    }

    assert_eq!(session.phase(), QuizPhase::Submitted {
        score: QuizScore::new(50).unwrap()
    });
    recording.expect("score recording started").wait().await.unwrap();

    app.recorder()
        .mark_lesson_complete(&user, &LessonId::new("1").unwrap())
        .await
        .unwrap();

    let summary = app.progress().summary(&user).await.unwrap();
    assert_eq!(summary.average_quiz_score, 50);
    assert_eq!(summary.completed_lesson_count, 1);
    assert_eq!(summary.streak_days, 0);
}

#[tokio::test]
async fn retake_overwrites_recorded_score() {
    let repo = InMemoryRepository::new();
    let quiz_id = QuizId::new("q1").unwrap();
    seed_quiz(&repo, &quiz_id, &["a", "b"]).await;
    let recorder = CompletionRecorder::new(fixed_clock(), Arc::new(repo.clone()));
    let quiz_loop = QuizLoopService::new(Arc::new(repo.clone()), recorder);
    let user = UserId::new("u1").unwrap();

    let mut session = quiz_loop.load(&quiz_id).await.unwrap();
    for pick in ["a", "b"] {
        session.select_answer(pick).unwrap();
        if let Some(handle) = quiz_loop.advance(&mut session, Some(&user)).recording {
            handle.wait().await.unwrap();
        }
    }
    assert_eq!(session.score(), Some(QuizScore::MAX));

    session.reset().unwrap();
    assert_eq!(session.phase(), QuizPhase::InProgress { index: 0 });
    quiz_loop.advance(&mut session, Some(&user));
    let handle = quiz_loop
        .advance(&mut session, Some(&user))
        .recording
        .unwrap();
    handle.wait().await.unwrap();

    let progress = repo.get_user_progress(&user).await.unwrap().unwrap();
    assert_eq!(progress.quiz_score(&quiz_id), Some(QuizScore::MIN));
}

#[tokio::test]
async fn app_options_select_fallback_and_strict_answers() {
    let repo = InMemoryRepository::new();
    let stored_id = QuizId::new("stored").unwrap();
    seed_quiz(&repo, &stored_id, &["a", "b"]).await;
    let storage = Storage::from_in_memory(repo);
    let quiz_id = QuizId::new("empty").unwrap();

    let lenient = AppServices::from_storage(&storage, fixed_clock(), AppOptions::default());
    let session = lenient.quiz_loop().load(&quiz_id).await.unwrap();
    assert_eq!(session.total_questions(), 4);
    assert_eq!(session.source(), ContentSource::SampleFallback);

    let strict = AppServices::from_storage(
        &storage,
        fixed_clock(),
        AppOptions {
            fallback: DefaultContentFallback::Propagate,
            strict_options: true,
        },
    );
    let err = strict.quiz_loop().load(&quiz_id).await.unwrap_err();
    assert!(matches!(err, QuizError::NotFound { .. }));

    let mut session = strict.quiz_loop().load(&stored_id).await.unwrap();
    let err = session.select_answer("e").unwrap_err();
    assert!(matches!(err, QuizError::InvalidOption { ref option } if option == "e"));
    assert_eq!(session.selected_answer(), None);
    session.select_answer("a").unwrap();
    assert_eq!(session.selected_answer(), Some("a"));

    // The permissive default records anything.
    let mut session = lenient.quiz_loop().load(&stored_id).await.unwrap();
    session.select_answer("e").unwrap();
    assert_eq!(session.selected_answer(), Some("e"));
}

/// Progress store whose score writes block until released.
struct GatedProgress {
    inner: InMemoryRepository,
    gate: Arc<Notify>,
}

#[async_trait]
impl ProgressRepository for GatedProgress {
    async fn get_user_progress(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProgress>, StorageError> {
        self.inner.get_user_progress(user_id).await
    }

    async fn upsert_lesson_completion(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.inner.upsert_lesson_completion(user_id, lesson_id, at).await
    }

    async fn upsert_quiz_score(
        &self,
        user_id: &UserId,
        quiz_id: &QuizId,
        score: QuizScore,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.gate.notified().await;
        self.inner.upsert_quiz_score(user_id, quiz_id, score, at).await
    }

    async fn set_streak(
        &self,
        user_id: &UserId,
        days: u32,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.inner.set_streak(user_id, days, at).await
    }
}

#[tokio::test]
async fn submission_does_not_wait_for_the_store() {
    let repo = InMemoryRepository::new();
    let quiz_id = QuizId::new("q1").unwrap();
    seed_quiz(&repo, &quiz_id, &["a"]).await;
    let gate = Arc::new(Notify::new());
    let progress = Arc::new(GatedProgress {
        inner: repo.clone(),
        gate: Arc::clone(&gate),
    });
    let quiz_loop = QuizLoopService::new(
        Arc::new(repo.clone()),
        CompletionRecorder::new(fixed_clock(), progress),
    );
    let user = UserId::new("u1").unwrap();

    let mut session = quiz_loop.load(&quiz_id).await.unwrap();
    session.select_answer("a").unwrap();
    let step = quiz_loop.advance(&mut session, Some(&user));

    assert_eq!(session.score(), Some(QuizScore::MAX));
    assert!(repo.get_user_progress(&user).await.unwrap().is_none());

    gate.notify_one();
    step.recording.unwrap().wait().await.unwrap();
    let stored = repo.get_user_progress(&user).await.unwrap().unwrap();
    assert_eq!(stored.quiz_score(&quiz_id), Some(QuizScore::MAX));
}
