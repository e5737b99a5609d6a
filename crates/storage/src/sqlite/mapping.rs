use course_core::model::{CourseId, LearnerId, LessonId, ModuleId, QuizAttempt, QuizId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn course_id_from_i64(v: i64) -> Result<CourseId, StorageError> {
    Ok(CourseId::new(i64_to_u64("course_id", v)?))
}

pub(crate) fn module_id_from_i64(v: i64) -> Result<ModuleId, StorageError> {
    Ok(ModuleId::new(i64_to_u64("module_id", v)?))
}

pub(crate) fn lesson_id_from_i64(v: i64) -> Result<LessonId, StorageError> {
    Ok(LessonId::new(i64_to_u64("lesson_id", v)?))
}

pub(crate) fn quiz_id_from_i64(v: i64) -> Result<QuizId, StorageError> {
    Ok(QuizId::new(i64_to_u64("quiz_id", v)?))
}

pub(crate) fn learner_id_to_i64(id: LearnerId) -> Result<i64, StorageError> {
    id_to_i64("learner_id", id.value())
}

pub(crate) fn passing_score_from_i64(v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid passing score: {v}")))
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizAttempt, StorageError> {
    let score_i64: i64 = row.try_get("score").map_err(ser)?;
    let score = u8::try_from(score_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid attempt score: {score_i64}")))?;
    let passed_i64: i64 = row.try_get("passed").map_err(ser)?;
    let attempted_at: chrono::DateTime<chrono::Utc> =
        row.try_get("attempted_at").map_err(ser)?;
    Ok(QuizAttempt {
        score,
        passed: passed_i64 != 0,
        attempted_at,
    })
}
