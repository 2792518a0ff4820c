use course_core::model::{
    Lesson, LessonId, Question, QuestionId, QuizId, QuizScore, UserId,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn quiz_id_from_str(v: String) -> Result<QuizId, StorageError> {
    QuizId::new(v).map_err(ser)
}

pub(crate) fn lesson_id_from_str(v: String) -> Result<LessonId, StorageError> {
    LessonId::new(v).map_err(ser)
}

pub(crate) fn user_id_from_str(v: String) -> Result<UserId, StorageError> {
    UserId::new(v).map_err(ser)
}

pub(crate) fn score_from_i64(v: i64) -> Result<QuizScore, StorageError> {
    QuizScore::try_from(v).map_err(ser)
}

pub(crate) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = QuestionId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    let options_json: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;

    Ok(Question::from_persisted(
        id,
        row.try_get("prompt").map_err(ser)?,
        options,
        row.try_get("correct_answer").map_err(ser)?,
    ))
}

pub(crate) fn map_lesson_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lesson, StorageError> {
    let id = lesson_id_from_str(row.try_get("id").map_err(ser)?)?;
    let video_url: String = row.try_get("video_url").map_err(ser)?;
    let level: Option<String> = row.try_get("level").map_err(ser)?;
    let order = u32_from_i64(
        "lesson_order",
        row.try_get::<i64, _>("lesson_order").map_err(ser)?,
    )?;

    Lesson::new(
        id,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        &video_url,
        order,
        row.try_get::<Option<String>, _>("content").map_err(ser)?,
    )
    .map(|lesson| lesson.with_level(level))
    .map_err(ser)
}
