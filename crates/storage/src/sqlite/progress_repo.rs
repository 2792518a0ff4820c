use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{LessonId, QuizId, QuizScore, UserId, UserProgress};
use sqlx::{Row, Sqlite, Transaction};

use super::SqliteRepository;
use super::mapping::{
    conn, lesson_id_from_str, quiz_id_from_str, score_from_i64, ser, u32_from_i64,
    user_id_from_str,
};
use crate::repository::{ProgressRepository, StorageError};

/// Creates the progress header if missing and refreshes `last_updated`.
async fn touch_progress(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &UserId,
    at: DateTime<Utc>,
) -> Result<(), StorageError> {
    sqlx::query(
        r"
            INSERT INTO user_progress (user_id, streak_days, last_updated)
            VALUES (?1, 0, ?2)
            ON CONFLICT(user_id) DO UPDATE SET last_updated = excluded.last_updated
        ",
    )
    .bind(user_id.as_str())
    .bind(at)
    .execute(&mut **tx)
    .await
    .map_err(conn)?;
    Ok(())
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_user_progress(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProgress>, StorageError> {
        // One read transaction so the header and child rows come from the
        // same snapshot.
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let Some(header) = sqlx::query(
            r"
                SELECT user_id, streak_days, last_updated
                FROM user_progress
                WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?
        else {
            return Ok(None);
        };

        let lesson_rows = sqlx::query(
            "SELECT lesson_id, completed_at FROM completed_lessons WHERE user_id = ?1",
        )
        .bind(user_id.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(conn)?;

        let score_rows = sqlx::query("SELECT quiz_id, score FROM quiz_scores WHERE user_id = ?1")
            .bind(user_id.as_str())
            .fetch_all(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;

        let mut completed_lessons = BTreeMap::new();
        for row in lesson_rows {
            let lesson_id = lesson_id_from_str(row.try_get("lesson_id").map_err(ser)?)?;
            let completed_at: DateTime<Utc> = row.try_get("completed_at").map_err(ser)?;
            completed_lessons.insert(lesson_id, completed_at);
        }

        let mut quiz_scores = BTreeMap::new();
        for row in score_rows {
            let quiz_id = quiz_id_from_str(row.try_get("quiz_id").map_err(ser)?)?;
            let score = score_from_i64(row.try_get::<i64, _>("score").map_err(ser)?)?;
            quiz_scores.insert(quiz_id, score);
        }

        Ok(Some(UserProgress::from_persisted(
            user_id_from_str(header.try_get("user_id").map_err(ser)?)?,
            completed_lessons,
            quiz_scores,
            u32_from_i64(
                "streak_days",
                header.try_get::<i64, _>("streak_days").map_err(ser)?,
            )?,
            header.try_get("last_updated").map_err(ser)?,
        )))
    }

    async fn upsert_lesson_completion(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        touch_progress(&mut tx, user_id, at).await?;

        sqlx::query(
            r"
                INSERT INTO completed_lessons (user_id, lesson_id, completed_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, lesson_id) DO NOTHING
            ",
        )
        .bind(user_id.as_str())
        .bind(lesson_id.as_str())
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn upsert_quiz_score(
        &self,
        user_id: &UserId,
        quiz_id: &QuizId,
        score: QuizScore,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        touch_progress(&mut tx, user_id, at).await?;

        sqlx::query(
            r"
                INSERT INTO quiz_scores (user_id, quiz_id, score, recorded_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id, quiz_id) DO UPDATE SET
                    score = excluded.score,
                    recorded_at = excluded.recorded_at
            ",
        )
        .bind(user_id.as_str())
        .bind(quiz_id.as_str())
        .bind(i64::from(score.value()))
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn set_streak(
        &self,
        user_id: &UserId,
        days: u32,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO user_progress (user_id, streak_days, last_updated)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id) DO UPDATE SET
                    streak_days = excluded.streak_days,
                    last_updated = excluded.last_updated
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(days))
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
