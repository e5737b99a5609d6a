use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{
    Course, CourseId, LearnerId, LessonId, ProgressMap, QuizAttempt, QuizId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for course outlines.
///
/// Courses are owned by the authoring system; the engine only ever reads
/// them fully materialized.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist or update a course outline (modules, lessons, quiz).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a fully materialized course by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures; a missing
    /// course is `Ok(None)`.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;
}

/// Repository contract for learner progress and quiz attempts.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the learner's completion map for one course.
    ///
    /// Lessons outside the course are not included; a learner with no rows
    /// yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn progress_map(
        &self,
        learner: LearnerId,
        course: CourseId,
    ) -> Result<ProgressMap, StorageError>;

    /// Record a completion. Returns true if a row was newly inserted.
    ///
    /// Idempotent: replaying the same completion keeps the original row and
    /// returns false, so retried requests never double-count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be written.
    async fn mark_completed(
        &self,
        learner: LearnerId,
        lesson: LessonId,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Append a quiz attempt for the learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be written.
    async fn record_quiz_attempt(
        &self,
        learner: LearnerId,
        quiz: QuizId,
        attempt: QuizAttempt,
    ) -> Result<(), StorageError>;

    /// All attempts the learner has made on a quiz, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn quiz_attempts(
        &self,
        learner: LearnerId,
        quiz: QuizId,
    ) -> Result<Vec<QuizAttempt>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
    completions: Arc<Mutex<HashMap<(LearnerId, LessonId), DateTime<Utc>>>>,
    attempts: Arc<Mutex<HashMap<(LearnerId, QuizId), Vec<QuizAttempt>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(course.id(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn progress_map(
        &self,
        learner: LearnerId,
        course: CourseId,
    ) -> Result<ProgressMap, StorageError> {
        let courses = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let Some(course) = courses.get(&course) else {
            // Same shape a relational join produces for an unknown course.
            return Ok(ProgressMap::new());
        };

        let completions = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let map = ProgressMap::from_completions(
            course
                .modules()
                .iter()
                .flat_map(|m| m.lessons())
                .filter_map(|lesson| {
                    completions
                        .get(&(learner, lesson.id()))
                        .map(|at| (lesson.id(), *at))
                }),
        );
        Ok(map)
    }

    async fn mark_completed(
        &self,
        learner: LearnerId,
        lesson: LessonId,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&(learner, lesson)) {
            return Ok(false);
        }
        guard.insert((learner, lesson), at);
        Ok(true)
    }

    async fn record_quiz_attempt(
        &self,
        learner: LearnerId,
        quiz: QuizId,
        attempt: QuizAttempt,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.entry((learner, quiz)).or_default().push(attempt);
        Ok(())
    }

    async fn quiz_attempts(
        &self,
        learner: LearnerId,
        quiz: QuizId,
    ) -> Result<Vec<QuizAttempt>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&(learner, quiz)).cloned().unwrap_or_default())
    }
}
