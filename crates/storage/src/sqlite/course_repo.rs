use std::collections::HashMap;

use course_core::model::{
    Course, CourseId, CourseModule, Lesson, LessonId, LessonKind, LessonResource, ModuleId, Quiz,
};
use sqlx::Row;
use url::Url;

use super::SqliteRepository;
use super::mapping::{
    conn, course_id_from_i64, id_to_i64, lesson_id_from_i64, module_id_from_i64,
    passing_score_from_i64, quiz_id_from_i64, ser,
};
use crate::repository::{CourseRepository, StorageError};

/// Deletes course-scoped rows whose ids are absent from `keep`. The base
/// statement must filter by course and bind it as its sole parameter.
async fn delete_stale(
    tx: &mut sqlx::SqliteConnection,
    base: &str,
    course_id: i64,
    keep: &[i64],
) -> Result<(), StorageError> {
    let sql = if keep.is_empty() {
        base.to_string()
    } else {
        let placeholders = vec!["?"; keep.len()].join(", ");
        format!("{base} AND id NOT IN ({placeholders})")
    };
    let mut query = sqlx::query(&sql).bind(course_id);
    for id in keep {
        query = query.bind(id);
    }
    query.execute(tx).await.map_err(conn)?;
    Ok(())
}

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut tx = self.pool().begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO courses (id, title)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title
            ",
        )
        .bind(id_to_i64("course_id", course.id().value())?)
        .bind(course.title())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // Children absent from the new outline are removed up front; foreign
        // key cascades clear their progress and attempt rows. Progress on
        // surviving lessons is untouched.
        let course_key = id_to_i64("course_id", course.id().value())?;
        let kept_modules = course
            .modules()
            .iter()
            .map(|m| id_to_i64("module_id", m.id().value()))
            .collect::<Result<Vec<_>, _>>()?;
        let kept_lessons = course
            .modules()
            .iter()
            .flat_map(CourseModule::lessons)
            .map(|l| id_to_i64("lesson_id", l.id().value()))
            .collect::<Result<Vec<_>, _>>()?;
        let kept_quizzes = course
            .modules()
            .iter()
            .filter_map(CourseModule::quiz)
            .map(|q| id_to_i64("quiz_id", q.id().value()))
            .collect::<Result<Vec<_>, _>>()?;

        delete_stale(
            &mut *tx,
            "DELETE FROM modules WHERE course_id = ?",
            course_key,
            &kept_modules,
        )
        .await?;
        delete_stale(
            &mut *tx,
            "DELETE FROM lessons WHERE module_id IN (SELECT id FROM modules WHERE course_id = ?)",
            course_key,
            &kept_lessons,
        )
        .await?;
        delete_stale(
            &mut *tx,
            "DELETE FROM quizzes WHERE module_id IN (SELECT id FROM modules WHERE course_id = ?)",
            course_key,
            &kept_quizzes,
        )
        .await?;

        for (position, module) in course.modules().iter().enumerate() {
            let position = i64::try_from(position).map_err(ser)?;
            sqlx::query(
                r"
                INSERT INTO modules (id, course_id, title, position)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    course_id = excluded.course_id,
                    title = excluded.title,
                    position = excluded.position
                ",
            )
            .bind(id_to_i64("module_id", module.id().value())?)
            .bind(id_to_i64("course_id", module.course_id().value())?)
            .bind(module.title())
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            for (lesson_position, lesson) in module.lessons().iter().enumerate() {
                let lesson_position = i64::try_from(lesson_position).map_err(ser)?;
                sqlx::query(
                    r"
                    INSERT INTO lessons (id, module_id, title, kind, position, duration_secs)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT(id) DO UPDATE SET
                        module_id = excluded.module_id,
                        title = excluded.title,
                        kind = excluded.kind,
                        position = excluded.position,
                        duration_secs = excluded.duration_secs
                    ",
                )
                .bind(id_to_i64("lesson_id", lesson.id().value())?)
                .bind(id_to_i64("module_id", lesson.module_id().value())?)
                .bind(lesson.title())
                .bind(lesson.kind().as_str())
                .bind(lesson_position)
                .bind(lesson.duration_secs().map(i64::from))
                .execute(&mut *tx)
                .await
                .map_err(conn)?;

                // Resources have no stable ids; replace the set wholesale.
                sqlx::query("DELETE FROM lesson_resources WHERE lesson_id = ?1")
                    .bind(id_to_i64("lesson_id", lesson.id().value())?)
                    .execute(&mut *tx)
                    .await
                    .map_err(conn)?;
                for resource in lesson.resources() {
                    sqlx::query(
                        r"
                        INSERT INTO lesson_resources (lesson_id, label, target)
                        VALUES (?1, ?2, ?3)
                        ",
                    )
                    .bind(id_to_i64("lesson_id", lesson.id().value())?)
                    .bind(resource.label())
                    .bind(resource.target().as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(conn)?;
                }
            }

            if let Some(quiz) = module.quiz() {
                sqlx::query(
                    r"
                    INSERT INTO quizzes (id, module_id, title, passing_score)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(id) DO UPDATE SET
                        module_id = excluded.module_id,
                        title = excluded.title,
                        passing_score = excluded.passing_score
                    ",
                )
                .bind(id_to_i64("quiz_id", quiz.id().value())?)
                .bind(id_to_i64("module_id", quiz.module_id().value())?)
                .bind(quiz.title())
                .bind(i64::from(quiz.passing_score()))
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        tracing::debug!(course = %course.id(), "course outline upserted");
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let course_id = id_to_i64("course_id", id.value())?;

        let course_row = sqlx::query("SELECT id, title FROM courses WHERE id = ?1")
            .bind(course_id)
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;
        let Some(course_row) = course_row else {
            return Ok(None);
        };
        let title: String = course_row.try_get("title").map_err(ser)?;

        let module_rows = sqlx::query(
            r"
            SELECT id, title, position
            FROM modules
            WHERE course_id = ?1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let lesson_rows = sqlx::query(
            r"
            SELECT l.id, l.module_id, l.title, l.kind, l.position, l.duration_secs
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            WHERE m.course_id = ?1
            ORDER BY l.position ASC, l.id ASC
            ",
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let resource_rows = sqlx::query(
            r"
            SELECT r.lesson_id, r.label, r.target
            FROM lesson_resources r
            JOIN lessons l ON l.id = r.lesson_id
            JOIN modules m ON m.id = l.module_id
            WHERE m.course_id = ?1
            ORDER BY r.id ASC
            ",
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let quiz_rows = sqlx::query(
            r"
            SELECT q.id, q.module_id, q.title, q.passing_score
            FROM quizzes q
            JOIN modules m ON m.id = q.module_id
            WHERE m.course_id = ?1
            ",
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut resources_by_lesson: HashMap<LessonId, Vec<LessonResource>> = HashMap::new();
        for row in &resource_rows {
            let lesson_id = lesson_id_from_i64(row.try_get("lesson_id").map_err(ser)?)?;
            let label: String = row.try_get("label").map_err(ser)?;
            let target: String = row.try_get("target").map_err(ser)?;
            let target = Url::parse(&target).map_err(ser)?;
            let resource = LessonResource::new(label, target).map_err(ser)?;
            resources_by_lesson.entry(lesson_id).or_default().push(resource);
        }

        let mut lessons_by_module: HashMap<ModuleId, Vec<Lesson>> = HashMap::new();
        for (position, row) in lesson_rows.iter().enumerate() {
            let lesson_id = lesson_id_from_i64(row.try_get("id").map_err(ser)?)?;
            let module_id = module_id_from_i64(row.try_get("module_id").map_err(ser)?)?;
            let lesson_title: String = row.try_get("title").map_err(ser)?;
            let kind: String = row.try_get("kind").map_err(ser)?;
            let order = u32::try_from(position).map_err(ser)?;
            let duration: Option<i64> = row.try_get("duration_secs").map_err(ser)?;

            let mut lesson = Lesson::new(
                lesson_id,
                module_id,
                lesson_title,
                LessonKind::from_str_lossy(&kind),
                order,
            )
            .map_err(ser)?;
            if let Some(duration) = duration {
                lesson = lesson.with_duration_secs(u32::try_from(duration).map_err(ser)?);
            }
            if let Some(resources) = resources_by_lesson.remove(&lesson_id) {
                lesson = lesson.with_resources(resources);
            }
            lessons_by_module.entry(module_id).or_default().push(lesson);
        }

        let mut quizzes_by_module: HashMap<ModuleId, Quiz> = HashMap::new();
        for row in &quiz_rows {
            let quiz_id = quiz_id_from_i64(row.try_get("id").map_err(ser)?)?;
            let module_id = module_id_from_i64(row.try_get("module_id").map_err(ser)?)?;
            let quiz_title: String = row.try_get("title").map_err(ser)?;
            let passing = passing_score_from_i64(row.try_get("passing_score").map_err(ser)?)?;
            let quiz = Quiz::new(quiz_id, module_id, quiz_title, passing).map_err(ser)?;
            quizzes_by_module.insert(module_id, quiz);
        }

        let mut modules = Vec::with_capacity(module_rows.len());
        for (position, row) in module_rows.iter().enumerate() {
            let module_id = module_id_from_i64(row.try_get("id").map_err(ser)?)?;
            let module_title: String = row.try_get("title").map_err(ser)?;
            let order = u32::try_from(position).map_err(ser)?;
            let module = CourseModule::new(
                module_id,
                course_id_from_i64(course_id)?,
                module_title,
                order,
                lessons_by_module.remove(&module_id).unwrap_or_default(),
                quizzes_by_module.remove(&module_id),
            )
            .map_err(ser)?;
            modules.push(module);
        }

        let course = Course::new(id, title, modules).map_err(ser)?;
        Ok(Some(course))
    }
}
