use async_trait::async_trait;
use course_core::model::{Question, QuizId};

use super::SqliteRepository;
use super::mapping::{conn, map_question_row, options_to_json};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait]
impl QuestionRepository for SqliteRepository {
    async fn get_questions(&self, quiz_id: &QuizId) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, prompt, options, correct_answer
                FROM questions
                WHERE quiz_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(quiz_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_question_row(&row)?);
        }
        Ok(out)
    }

    async fn upsert_question(
        &self,
        quiz_id: &QuizId,
        position: u32,
        question: &Question,
    ) -> Result<(), StorageError> {
        let options = options_to_json(question.options())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        // A question id appears at most once per quiz; moving it frees its old slot.
        sqlx::query("DELETE FROM questions WHERE quiz_id = ?1 AND id = ?2 AND position <> ?3")
            .bind(quiz_id.as_str())
            .bind(question.id().as_str())
            .bind(i64::from(position))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO questions (quiz_id, position, id, prompt, options, correct_answer)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(quiz_id, position) DO UPDATE SET
                    id = excluded.id,
                    prompt = excluded.prompt,
                    options = excluded.options,
                    correct_answer = excluded.correct_answer
            ",
        )
        .bind(quiz_id.as_str())
        .bind(i64::from(position))
        .bind(question.id().as_str())
        .bind(question.prompt())
        .bind(options)
        .bind(question.correct_answer())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
