use async_trait::async_trait;
use course_core::model::{Lesson, LessonId};

use super::SqliteRepository;
use super::mapping::{conn, map_lesson_row};
use crate::repository::{LessonRepository, StorageError};

#[async_trait]
impl LessonRepository for SqliteRepository {
    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, title, description, video_url, lesson_order, content, level
                FROM lessons
                WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn list_lessons(&self) -> Result<Vec<Lesson>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, title, description, video_url, lesson_order, content, level
                FROM lessons
                ORDER BY lesson_order ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lessons (id, title, description, video_url, lesson_order, content, level)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    video_url = excluded.video_url,
                    lesson_order = excluded.lesson_order,
                    content = excluded.content,
                    level = excluded.level
            ",
        )
        .bind(lesson.id().as_str())
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.video_url().as_str())
        .bind(i64::from(lesson.order()))
        .bind(lesson.content())
        .bind(lesson.level())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
