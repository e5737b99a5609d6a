use course_core::model::{CourseOutline, LessonId, ModuleId, ProgressMap};

/// Unlock and completion state for one sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonUnlock {
    pub lesson_id: LessonId,
    pub module_id: ModuleId,
    pub unlocked: bool,
    pub completed: bool,
}

/// Whether a single lesson is accessible to the learner.
///
/// - The first lesson in the flattened order is always unlocked.
/// - A completed lesson is always unlocked: completion implies the learner
///   once had access, even when progress data arrives out of order.
/// - Any other lesson is unlocked iff its flattened predecessor is complete.
/// - A lesson unknown to the outline is locked. This is a rendering-path
///   query; inconsistent data must never panic.
#[must_use]
pub fn is_unlocked(lesson_id: LessonId, outline: &CourseOutline, progress: &ProgressMap) -> bool {
    let Some(position) = outline.position(lesson_id) else {
        return false;
    };
    if position.index == 0 || progress.is_completed(lesson_id) {
        return true;
    }
    outline
        .lesson_at(position.index - 1)
        .is_some_and(|prev| progress.is_completed(prev))
}

/// Unlock states for every lesson, in flattened order.
///
/// Each row resolves through the same position lookup as [`is_unlocked`],
/// so the two agree pointwise even on inconsistent outlines: a duplicated
/// lesson id resolves to its first occurrence in both.
#[must_use]
pub fn unlock_states(outline: &CourseOutline, progress: &ProgressMap) -> Vec<LessonUnlock> {
    outline
        .positions()
        .iter()
        .map(|position| LessonUnlock {
            lesson_id: position.lesson_id,
            module_id: position.module_id,
            unlocked: is_unlocked(position.lesson_id, outline, progress),
            completed: progress.is_completed(position.lesson_id),
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{
        Course, CourseId, CourseModule, Lesson, LessonKind, Quiz, QuizId,
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

    #[test]
    fn first_lesson_unlocked_under_empty_progress() {
        let outline = build_outline();
        let progress = ProgressMap::new();

        assert!(is_unlocked(LessonId::new(1), &outline, &progress));
        assert!(!is_unlocked(LessonId::new(2), &outline, &progress));
        assert!(!is_unlocked(LessonId::new(3), &outline, &progress));
    }

    #[test]
    fn lesson_unlocks_when_predecessor_completes() {
        let outline = build_outline();
        let mut progress = ProgressMap::new();
        progress.complete(LessonId::new(1), fixed_now());

        assert!(is_unlocked(LessonId::new(2), &outline, &progress));
        assert!(!is_unlocked(LessonId::new(3), &outline, &progress));

        progress.complete(LessonId::new(2), fixed_now());
        assert!(is_unlocked(LessonId::new(3), &outline, &progress));
    }

    #[test]
    fn completed_lesson_is_unlocked_even_with_incomplete_predecessor() {
        let outline = build_outline();
        let mut progress = ProgressMap::new();
        // Out-of-order data: lesson 3 completed while 1 and 2 are not.
        progress.complete(LessonId::new(3), fixed_now());

        assert!(is_unlocked(LessonId::new(3), &outline, &progress));
        assert!(!is_unlocked(LessonId::new(2), &outline, &progress));
    }

    #[test]
    fn unknown_lesson_fails_closed() {
        let outline = build_outline();
        let mut progress = ProgressMap::new();
        progress.complete(LessonId::new(99), fixed_now());

        assert!(!is_unlocked(LessonId::new(99), &outline, &progress));
    }

    #[test]
    fn unlock_states_agree_with_point_queries() {
        let outline = build_outline();
        let mut progress = ProgressMap::new();
        progress.complete(LessonId::new(1), fixed_now());
        progress.complete(LessonId::new(3), fixed_now());

        let states = unlock_states(&outline, &progress);
        assert_eq!(states.len(), outline.len());
        for state in &states {
            assert_eq!(
                state.unlocked,
                is_unlocked(state.lesson_id, &outline, &progress),
                "disagreement for {:?}",
                state.lesson_id
            );
            assert_eq!(state.completed, progress.is_completed(state.lesson_id));
        }
    }

    #[test]
    fn duplicated_lesson_id_resolves_to_first_occurrence() {
        // Inconsistent authoring data: the same lesson id appears twice in
        // one module. Both rows must mirror the point query, which resolves
        // the first occurrence.
        let lessons = vec![
            build_lesson(1, 1, 1),
            build_lesson(1, 1, 2),
            build_lesson(2, 1, 3),
        ];
        let module =
            CourseModule::new(ModuleId::new(1), CourseId::new(1), "A", 1, lessons, None).unwrap();
        let course = Course::new(CourseId::new(1), "Course", vec![module]).unwrap();
        let outline = CourseOutline::from_course(&course);
        let progress = ProgressMap::new();

        let states = unlock_states(&outline, &progress);
        assert_eq!(states.len(), 3);
        assert!(states[0].unlocked);
        assert!(states[1].unlocked);
        assert!(!states[2].unlocked);
        for state in &states {
            assert_eq!(
                state.unlocked,
                is_unlocked(state.lesson_id, &outline, &progress)
            );
        }
    }

    #[test]
    fn unlock_states_on_empty_outline_is_empty() {
        let course = Course::new(CourseId::new(1), "Empty", Vec::new()).unwrap();
        let outline = CourseOutline::from_course(&course);
        assert!(unlock_states(&outline, &ProgressMap::new()).is_empty());
    }
}
