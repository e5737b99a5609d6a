use std::collections::HashMap;

use crate::model::course::Course;
use crate::model::ids::{CourseId, LessonId, ModuleId};

//
// ─── POSITIONS ─────────────────────────────────────────────────────────────────
//

/// Precomputed placement of one lesson in the flattened global order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonPosition {
    pub lesson_id: LessonId,
    /// Index in the flattened global order.
    pub index: usize,
    pub module_id: ModuleId,
    /// Index of the owning module in course-order.
    pub module_index: usize,
    pub is_last_in_module: bool,
    pub module_has_quiz: bool,
}

/// Per-module slice of the outline, for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineModule {
    pub module_id: ModuleId,
    pub lesson_count: usize,
    pub has_quiz: bool,
}

//
// ─── OUTLINE ───────────────────────────────────────────────────────────────────
//

/// The flattened global lesson order of a course.
///
/// Built once per page view from a fully materialized `Course`: modules in
/// course-order, lessons in lesson-order within each module, concatenated
/// into one sequence. All lookups are by value and O(1); unknown lesson ids
/// return `None` so callers can fail closed instead of panicking on
/// inconsistent data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOutline {
    course_id: CourseId,
    flattened: Vec<LessonPosition>,
    by_lesson: HashMap<LessonId, usize>,
    modules: Vec<OutlineModule>,
}

impl CourseOutline {
    /// Flatten a course into its global lesson order.
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        let mut flattened = Vec::with_capacity(course.lesson_count());
        let mut by_lesson = HashMap::with_capacity(course.lesson_count());
        let mut modules = Vec::with_capacity(course.modules().len());

        for (module_index, module) in course.modules().iter().enumerate() {
            let lesson_count = module.lesson_count();
            modules.push(OutlineModule {
                module_id: module.id(),
                lesson_count,
                has_quiz: module.has_quiz(),
            });

            for (lesson_index, lesson) in module.lessons().iter().enumerate() {
                let index = flattened.len();
                flattened.push(LessonPosition {
                    lesson_id: lesson.id(),
                    index,
                    module_id: module.id(),
                    module_index,
                    is_last_in_module: lesson_index + 1 == lesson_count,
                    module_has_quiz: module.has_quiz(),
                });
                // A duplicate lesson id is inconsistent data; the first
                // occurrence wins so lookups stay deterministic.
                by_lesson.entry(lesson.id()).or_insert(index);
            }
        }

        Self {
            course_id: course.id(),
            flattened,
            by_lesson,
            modules,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    /// Number of lessons in the flattened order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flattened.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flattened.is_empty()
    }

    /// The first lesson in the flattened order, if the course has any.
    #[must_use]
    pub fn first_lesson(&self) -> Option<LessonId> {
        self.flattened.first().map(|p| p.lesson_id)
    }

    /// Placement of a lesson, or `None` for ids unknown to this outline.
    #[must_use]
    pub fn position(&self, lesson_id: LessonId) -> Option<&LessonPosition> {
        self.by_lesson
            .get(&lesson_id)
            .and_then(|&index| self.flattened.get(index))
    }

    /// Lesson at the given flattened index.
    #[must_use]
    pub fn lesson_at(&self, index: usize) -> Option<LessonId> {
        self.flattened.get(index).map(|p| p.lesson_id)
    }

    /// The lesson immediately before the given one in flattened order.
    #[must_use]
    pub fn prev_of(&self, lesson_id: LessonId) -> Option<LessonId> {
        let position = self.position(lesson_id)?;
        position
            .index
            .checked_sub(1)
            .and_then(|i| self.lesson_at(i))
    }

    /// The lesson immediately after the given one in flattened order.
    #[must_use]
    pub fn next_of(&self, lesson_id: LessonId) -> Option<LessonId> {
        let position = self.position(lesson_id)?;
        self.lesson_at(position.index + 1)
    }

    /// All placements in flattened order.
    #[must_use]
    pub fn positions(&self) -> &[LessonPosition] {
        &self.flattened
    }

    /// Lesson ids in flattened order.
    pub fn lesson_ids(&self) -> impl Iterator<Item = LessonId> + '_ {
        self.flattened.iter().map(|p| p.lesson_id)
    }

    /// Modules in course-order.
    #[must_use]
    pub fn modules(&self) -> &[OutlineModule] {
        &self.modules
    }

    /// Whether the module at `module_index` is the last in the course.
    #[must_use]
    pub fn is_last_module(&self, module_index: usize) -> bool {
        !self.modules.is_empty() && module_index + 1 == self.modules.len()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::QuizId;
    use crate::model::lesson::{Lesson, LessonKind};
    use crate::model::module::CourseModule;
    use crate::model::quiz::Quiz;

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

    fn build_course() -> Course {
        let quiz = Quiz::new(QuizId::new(1), ModuleId::new(1), "Module quiz", 70).unwrap();
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
        Course::new(CourseId::new(1), "Course", vec![module_a, module_b]).unwrap()
    }

    #[test]
    fn flattens_modules_then_lessons() {
        let outline = CourseOutline::from_course(&build_course());
        let ids: Vec<u64> = outline.lesson_ids().map(|id| id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(outline.first_lesson(), Some(LessonId::new(1)));
        assert_eq!(outline.len(), 3);
    }

    #[test]
    fn positions_carry_module_flags() {
        let outline = CourseOutline::from_course(&build_course());

        let first = outline.position(LessonId::new(1)).unwrap();
        assert!(!first.is_last_in_module);
        assert!(first.module_has_quiz);
        assert_eq!(first.module_index, 0);

        let second = outline.position(LessonId::new(2)).unwrap();
        assert!(second.is_last_in_module);
        assert!(second.module_has_quiz);

        let third = outline.position(LessonId::new(3)).unwrap();
        assert!(third.is_last_in_module);
        assert!(!third.module_has_quiz);
        assert!(outline.is_last_module(third.module_index));
        assert!(!outline.is_last_module(first.module_index));
    }

    #[test]
    fn prev_and_next_follow_flattened_order() {
        let outline = CourseOutline::from_course(&build_course());
        assert_eq!(outline.prev_of(LessonId::new(1)), None);
        assert_eq!(outline.next_of(LessonId::new(1)), Some(LessonId::new(2)));
        assert_eq!(outline.prev_of(LessonId::new(3)), Some(LessonId::new(2)));
        assert_eq!(outline.next_of(LessonId::new(3)), None);
    }

    #[test]
    fn unknown_lesson_yields_none() {
        let outline = CourseOutline::from_course(&build_course());
        assert!(outline.position(LessonId::new(99)).is_none());
        assert!(outline.prev_of(LessonId::new(99)).is_none());
        assert!(outline.next_of(LessonId::new(99)).is_none());
    }

    #[test]
    fn empty_course_yields_empty_outline() {
        let course = Course::new(CourseId::new(1), "Empty", Vec::new()).unwrap();
        let outline = CourseOutline::from_course(&course);
        assert!(outline.is_empty());
        assert_eq!(outline.first_lesson(), None);
        assert!(!outline.is_last_module(0));
    }
}
