use course_core::model::{CourseOutline, LessonId, ProgressMap};

use super::navigation::LessonNavigation;
use super::progress::ProgressSummary;
use super::unlock::{LessonUnlock, unlock_states};

/// What the forward control should do, as data.
///
/// The view never formats button text; it hands the UI the decision the
/// gating rule already made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardAction {
    /// Advance to the flattened successor.
    NextLesson(LessonId),
    /// Surface the current module's quiz in the slot "next" would occupy.
    TakeQuiz { final_exam: bool },
    /// Current lesson is the course's last and nothing gates it.
    CourseEnd,
}

/// Presentation-agnostic composition of the engine's outputs for one page
/// view: sidebar unlock states, progress bars, and navigation.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub sidebar: Vec<LessonUnlock>,
    pub summary: ProgressSummary,
    /// Navigation for `current`; fully closed when `current` is `None` or
    /// unknown to the outline.
    pub navigation: LessonNavigation,
    pub forward: ForwardAction,
    pub current: Option<LessonId>,
}

impl PlayerView {
    /// Compose a view from the engine's pure outputs.
    #[must_use]
    pub fn build(
        outline: &CourseOutline,
        progress: &ProgressMap,
        summary: &ProgressSummary,
        current: Option<LessonId>,
    ) -> Self {
        let navigation = current.map_or_else(LessonNavigation::closed, |lesson| {
            LessonNavigation::resolve(lesson, outline)
        });

        let forward = if navigation.quiz_gates_forward() {
            ForwardAction::TakeQuiz {
                final_exam: navigation.is_final_exam,
            }
        } else {
            match navigation.next {
                Some(next) => ForwardAction::NextLesson(next),
                None => ForwardAction::CourseEnd,
            }
        };

        Self {
            sidebar: unlock_states(outline, progress),
            summary: summary.clone(),
            navigation,
            forward,
            current,
        }
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

    fn build_outline() -> CourseOutline {
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
        CourseOutline::from_course(&course)
    }

    fn build_view(progress: &ProgressMap, current: Option<LessonId>) -> PlayerView {
        let outline = build_outline();
        let summary = ProgressSummary::aggregate(&outline, progress);
        PlayerView::build(&outline, progress, &summary, current)
    }

    #[test]
    fn forward_is_next_lesson_mid_module() {
        let view = build_view(&ProgressMap::new(), Some(LessonId::new(1)));
        assert_eq!(view.forward, ForwardAction::NextLesson(LessonId::new(2)));
    }

    #[test]
    fn quiz_occupies_the_forward_slot() {
        let view = build_view(&ProgressMap::new(), Some(LessonId::new(2)));
        assert_eq!(view.forward, ForwardAction::TakeQuiz { final_exam: false });
        // The successor still exists for the resolver's callers.
        assert_eq!(view.navigation.next, Some(LessonId::new(3)));
    }

    #[test]
    fn course_end_after_the_last_lesson() {
        let view = build_view(&ProgressMap::new(), Some(LessonId::new(3)));
        assert_eq!(view.forward, ForwardAction::CourseEnd);
    }

    #[test]
    fn sidebar_matches_progress() {
        let mut progress = ProgressMap::new();
        progress.complete(LessonId::new(1), fixed_now());

        let view = build_view(&progress, Some(LessonId::new(2)));
        assert_eq!(view.sidebar.len(), 3);
        assert!(view.sidebar[0].completed);
        assert!(view.sidebar[1].unlocked);
        assert!(!view.sidebar[2].unlocked);
        assert_eq!(view.summary.course().completed, 1);
    }

    #[test]
    fn no_current_lesson_closes_navigation() {
        let view = build_view(&ProgressMap::new(), None);
        assert_eq!(view.navigation.next, None);
        assert_eq!(view.forward, ForwardAction::CourseEnd);
        assert_eq!(view.current, None);
    }
}
