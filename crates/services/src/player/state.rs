use chrono::{DateTime, Utc};

use course_core::model::{CourseOutline, LessonId, ProgressMap};

use super::progress::ProgressSummary;
use super::unlock;
use super::view::PlayerView;

/// Result of marking one lesson complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// False when the completion was a replay of an already-complete lesson.
    pub newly_completed: bool,
    /// The aggregate as of the same logical step as the map update.
    pub summary: ProgressSummary,
}

/// In-memory player state for one learner and course: the outline, the
/// progress map, and a cached aggregate.
///
/// The map and the cached summary move together: `complete_lesson` updates
/// both in one step, so no caller ever observes a map that disagrees with
/// the percentages derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    outline: CourseOutline,
    progress: ProgressMap,
    summary: ProgressSummary,
}

impl PlayerState {
    #[must_use]
    pub fn new(outline: CourseOutline, progress: ProgressMap) -> Self {
        let summary = ProgressSummary::aggregate(&outline, &progress);
        Self {
            outline,
            progress,
            summary,
        }
    }

    #[must_use]
    pub fn outline(&self) -> &CourseOutline {
        &self.outline
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    #[must_use]
    pub fn summary(&self) -> &ProgressSummary {
        &self.summary
    }

    /// Whether a lesson is currently accessible.
    #[must_use]
    pub fn is_unlocked(&self, lesson_id: LessonId) -> bool {
        unlock::is_unlocked(lesson_id, &self.outline, &self.progress)
    }

    /// Build the composed view for the UI layer.
    #[must_use]
    pub fn view(&self, current: Option<LessonId>) -> PlayerView {
        PlayerView::build(&self.outline, &self.progress, &self.summary, current)
    }

    /// Mark a lesson complete, updating map and aggregate in one step.
    ///
    /// Idempotent; a replayed completion changes nothing and reports
    /// `newly_completed: false`. Deliberately does not check the unlock
    /// policy: out-of-order completion (an instructor granting credit) is
    /// legal here, and the unlock policy independently treats completed
    /// lessons as unlocked.
    pub fn complete_lesson(&mut self, lesson_id: LessonId, at: DateTime<Utc>) -> CompletionOutcome {
        let newly_completed = self.progress.complete(lesson_id, at);
        if newly_completed {
            self.summary.apply_completion(lesson_id, &self.outline);
        }
        CompletionOutcome {
            newly_completed,
            summary: self.summary.clone(),
        }
    }

    /// Undo an optimistic local completion after the persistence layer
    /// reported an explicit failure. The workflow is the only caller.
    pub(crate) fn revert_completion(&mut self, lesson_id: LessonId) {
        self.progress.revert(lesson_id);
        self.summary = ProgressSummary::aggregate(&self.outline, &self.progress);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{
        Course, CourseId, CourseModule, Lesson, LessonKind, ModuleId, Quiz, QuizId,
    };
    use course_core::time::fixed_now;

    fn build_lesson(id: u64, module: u64, order: u32) -> Lesson {
        Lesson::new(
            LessonId::new(id),
            ModuleId::new(module),
            format!("Lesson {id}"),
            LessonKind::Text,
            order,
        )
        .unwrap()
    }

    fn build_state() -> PlayerState {
        let quiz = Quiz::new(QuizId::new(1), ModuleId::new(1), "Quiz", 70).unwrap();
        let module_a = CourseModule::new(
            ModuleId::new(1),
            CourseId::new(1),
            "A",
            1,
            vec![build_lesson(1, 1, 1), build_lesson(2, 1, 2)],
            Some(quiz),
        )
        .unwrap();
        let module_b = CourseModule::new(
            ModuleId::new(2),
            CourseId::new(1),
            "B",
            2,
            vec![build_lesson(3, 2, 1)],
            None,
        )
        .unwrap();
        let course = Course::new(CourseId::new(1), "Course", vec![module_a, module_b]).unwrap();
        PlayerState::new(CourseOutline::from_course(&course), ProgressMap::new())
    }

    #[test]
    fn completion_updates_map_and_summary_together() {
        let mut state = build_state();

        let outcome = state.complete_lesson(LessonId::new(1), fixed_now());
        assert!(outcome.newly_completed);
        assert!(state.progress().is_completed(LessonId::new(1)));
        assert_eq!(outcome.summary.course().completed, 1);
        assert_eq!(state.summary().course().completed, 1);
        assert_eq!(
            *state.summary(),
            ProgressSummary::aggregate(state.outline(), state.progress())
        );
    }

    #[test]
    fn replayed_completion_is_a_noop() {
        let mut state = build_state();
        state.complete_lesson(LessonId::new(1), fixed_now());
        let before = state.clone();

        let outcome = state.complete_lesson(LessonId::new(1), fixed_now());
        assert!(!outcome.newly_completed);
        assert_eq!(state, before);
        assert_eq!(outcome.summary.course().completed, 1);
    }

    #[test]
    fn completion_unlocks_the_next_lesson() {
        let mut state = build_state();
        assert!(!state.is_unlocked(LessonId::new(2)));

        state.complete_lesson(LessonId::new(1), fixed_now());
        assert!(state.is_unlocked(LessonId::new(2)));
    }

    #[test]
    fn out_of_order_completion_is_permitted() {
        let mut state = build_state();

        // Lesson 3 is locked, but completion does not consult the policy.
        assert!(!state.is_unlocked(LessonId::new(3)));
        let outcome = state.complete_lesson(LessonId::new(3), fixed_now());
        assert!(outcome.newly_completed);
        // Completion implies unlocked; no "locked but completed" view.
        assert!(state.is_unlocked(LessonId::new(3)));
    }

    #[test]
    fn revert_restores_the_previous_state() {
        let mut state = build_state();
        let before = state.clone();

        state.complete_lesson(LessonId::new(1), fixed_now());
        state.revert_completion(LessonId::new(1));

        assert_eq!(state, before);
        assert_eq!(
            *state.summary(),
            ProgressSummary::aggregate(state.outline(), state.progress())
        );
    }
}
