use std::sync::Arc;

use course_core::Clock;
use course_core::model::{CourseId, CourseOutline, LearnerId, LessonId, ModuleId, Quiz, QuizAttempt};
use storage::repository::{CourseRepository, ProgressRepository};

use crate::error::PlayerError;
use super::state::{CompletionOutcome, PlayerState};

/// Orchestrates player loading and persisted completion.
///
/// Completion is optimistic: the local state is updated first, then the
/// write goes to the progress store. Only an explicit persistence failure
/// reverts the local completion; the store itself is idempotent, so a
/// retried request that already landed is simply confirmed.
#[derive(Clone)]
pub struct PlayerLoopService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl PlayerLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            progress,
        }
    }

    /// Load the player state for one learner and course.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::CourseNotFound` for an unknown course, or
    /// storage errors from either repository.
    pub async fn load_player(
        &self,
        course_id: CourseId,
        learner: LearnerId,
    ) -> Result<PlayerState, PlayerError> {
        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or(PlayerError::CourseNotFound(course_id))?;
        let outline = CourseOutline::from_course(&course);
        let progress = self.progress.progress_map(learner, course_id).await?;
        tracing::debug!(
            course = %course_id,
            learner = %learner,
            lessons = outline.len(),
            completed = progress.completed_count(),
            "player loaded"
        );
        Ok(PlayerState::new(outline, progress))
    }

    /// Complete a lesson locally and persist it.
    ///
    /// The local map and aggregate update in one step before the write; on
    /// persistence failure the local completion is reverted and the error
    /// propagates so the caller can surface a retry.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Storage` when the completion cannot be
    /// persisted. The state is left as it was before the call.
    pub async fn complete_lesson(
        &self,
        state: &mut PlayerState,
        learner: LearnerId,
        lesson_id: LessonId,
    ) -> Result<CompletionOutcome, PlayerError> {
        let now = self.clock.now();
        let outcome = state.complete_lesson(lesson_id, now);

        match self.progress.mark_completed(learner, lesson_id, now).await {
            Ok(_inserted) => {
                tracing::debug!(
                    learner = %learner,
                    lesson = %lesson_id,
                    newly_completed = outcome.newly_completed,
                    "completion reconciled"
                );
                Ok(outcome)
            }
            Err(err) => {
                if outcome.newly_completed {
                    state.revert_completion(lesson_id);
                }
                tracing::warn!(
                    learner = %learner,
                    lesson = %lesson_id,
                    error = %err,
                    "completion persistence failed, reverted"
                );
                Err(err.into())
            }
        }
    }

    /// Load a module's quiz with the learner's recorded attempts folded in.
    ///
    /// Returns `Ok(None)` when the module does not exist or has no quiz.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::CourseNotFound` for an unknown course, or
    /// storage errors from either repository.
    pub async fn load_quiz(
        &self,
        course_id: CourseId,
        module_id: ModuleId,
        learner: LearnerId,
    ) -> Result<Option<Quiz>, PlayerError> {
        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or(PlayerError::CourseNotFound(course_id))?;
        let Some(quiz) = course.module(module_id).and_then(|m| m.quiz()) else {
            return Ok(None);
        };

        let attempts = self.progress.quiz_attempts(learner, quiz.id()).await?;
        let quiz = Quiz::from_persisted(
            quiz.id(),
            quiz.module_id(),
            quiz.title(),
            quiz.passing_score(),
            attempts,
        )?;
        Ok(Some(quiz))
    }

    /// Record a quiz attempt locally and persist it.
    ///
    /// The quiz is only updated once the write lands, so a persistence
    /// failure leaves the caller's quiz untouched.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Quiz` for an invalid score, or
    /// `PlayerError::Storage` when the attempt cannot be persisted.
    pub async fn submit_quiz_attempt(
        &self,
        quiz: &mut Quiz,
        learner: LearnerId,
        score: u8,
    ) -> Result<QuizAttempt, PlayerError> {
        let mut updated = quiz.clone();
        let attempt = updated.record_attempt(score, self.clock.now())?;

        self.progress
            .record_quiz_attempt(learner, quiz.id(), attempt)
            .await?;
        *quiz = updated;
        tracing::debug!(
            learner = %learner,
            quiz = %quiz.id(),
            score,
            passed = attempt.passed,
            "quiz attempt recorded"
        );
        Ok(attempt)
    }
}
