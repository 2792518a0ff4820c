//! `SQLite` backend for quiz content and user progress.
//!
//! Tables: `questions` keyed by `(quiz_id, position)`, `lessons`, and the
//! per-user `user_progress` header with its `completed_lessons` and
//! `quiz_scores` children. Options are stored as a JSON array of strings.

use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{LessonRepository, ProgressRepository, QuestionRepository, Storage};

mod lesson_repo;
mod mapping;
mod migrate;
mod progress_repo;
mod question_repo;

/// Applied to every pooled connection. Child rows of `user_progress` rely on
/// foreign keys; WAL lets catalogue and profile reads run beside recorder
/// writes.
const CONNECTION_PRAGMAS: [&str; 3] = [
    "PRAGMA foreign_keys = ON;",
    "PRAGMA journal_mode = WAL;",
    "PRAGMA busy_timeout = 5000;",
];

/// Pool-backed implementation of every gateway trait.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open a pool on `database_url` without touching the schema.
    ///
    /// Use [`SqliteRepository::open`] unless the caller migrates separately.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or a
    /// connection pragma fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    for pragma in CONNECTION_PRAGMAS {
                        sqlx::query(pragma).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Connect and bring the course schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connecting or migrating fails.
    pub async fn open(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply pending schema versions: v1 creates the content and progress
    /// tables, v2 adds lesson levels. Already-applied versions are skipped.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails; the failing
    /// version is rolled back.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Gateways for questions, lessons and progress sharing one `SQLite` pool.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = Arc::new(SqliteRepository::open(database_url).await?);
        let questions: Arc<dyn QuestionRepository> = repo.clone();
        let lessons: Arc<dyn LessonRepository> = repo.clone();
        let progress: Arc<dyn ProgressRepository> = repo;
        Ok(Self {
            questions,
            lessons,
            progress,
        })
    }
}
