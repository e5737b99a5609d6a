use chrono::{DateTime, Utc};
use course_core::model::{CourseId, LearnerId, LessonId, ProgressMap, QuizAttempt, QuizId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, learner_id_to_i64, lesson_id_from_i64, map_attempt_row, ser};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn progress_map(
        &self,
        learner: LearnerId,
        course: CourseId,
    ) -> Result<ProgressMap, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT p.lesson_id, p.completed_at
            FROM lesson_progress p
            JOIN lessons l ON l.id = p.lesson_id
            JOIN modules m ON m.id = l.module_id
            WHERE p.learner_id = ?1 AND m.course_id = ?2
            ",
        )
        .bind(learner_id_to_i64(learner)?)
        .bind(id_to_i64("course_id", course.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut completions = Vec::with_capacity(rows.len());
        for row in &rows {
            let lesson = lesson_id_from_i64(row.try_get("lesson_id").map_err(ser)?)?;
            let completed_at: DateTime<Utc> = row.try_get("completed_at").map_err(ser)?;
            completions.push((lesson, completed_at));
        }
        Ok(ProgressMap::from_completions(completions))
    }

    async fn mark_completed(
        &self,
        learner: LearnerId,
        lesson: LessonId,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        // Replay-safe: a retried completion hits the conflict clause and
        // leaves the original row (and its timestamp) in place.
        let result = sqlx::query(
            r"
            INSERT INTO lesson_progress (learner_id, lesson_id, completed_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(learner_id, lesson_id) DO NOTHING
            ",
        )
        .bind(learner_id_to_i64(learner)?)
        .bind(id_to_i64("lesson_id", lesson.value())?)
        .bind(at)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            tracing::debug!(learner = %learner, lesson = %lesson, "lesson completion persisted");
        }
        Ok(inserted)
    }

    async fn record_quiz_attempt(
        &self,
        learner: LearnerId,
        quiz: QuizId,
        attempt: QuizAttempt,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_attempts (quiz_id, learner_id, score, passed, attempted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_to_i64("quiz_id", quiz.value())?)
        .bind(learner_id_to_i64(learner)?)
        .bind(i64::from(attempt.score))
        .bind(i64::from(attempt.passed))
        .bind(attempt.attempted_at)
        .execute(self.pool())
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn quiz_attempts(
        &self,
        learner: LearnerId,
        quiz: QuizId,
    ) -> Result<Vec<QuizAttempt>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT score, passed, attempted_at
            FROM quiz_attempts
            WHERE quiz_id = ?1 AND learner_id = ?2
            ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("quiz_id", quiz.value())?)
        .bind(learner_id_to_i64(learner)?)
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        rows.iter().map(map_attempt_row).collect()
    }
}
