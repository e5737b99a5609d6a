use course_core::model::{CourseOutline, LessonId};

/// Navigation targets and gating flags for the current lesson.
///
/// The resolver stays free of presentation concerns: it exposes the raw
/// pointers and booleans, and the caller composes the forward action. The
/// one invariant encoded here is that a module's quiz cannot be skipped by
/// "next lesson" mechanics - when the current lesson is the last of a module
/// with a quiz, the quiz occupies the forward slot even though `next` still
/// points at the following module's first lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonNavigation {
    /// Flattened predecessor, `None` when current is the first lesson.
    pub prev: Option<LessonId>,
    /// Flattened successor, `None` when current is the last lesson of the
    /// course. Present even when a quiz gates the forward action.
    pub next: Option<LessonId>,
    pub is_last_in_module: bool,
    pub module_has_quiz: bool,
    /// Derived, never stored: the gating quiz of the course's last module.
    pub is_final_exam: bool,
}

impl LessonNavigation {
    /// Resolve navigation for a lesson. Unknown lesson ids produce a fully
    /// closed navigation rather than an error; this is a rendering path.
    #[must_use]
    pub fn resolve(lesson_id: LessonId, outline: &CourseOutline) -> Self {
        let Some(position) = outline.position(lesson_id) else {
            return Self::closed();
        };

        let is_final_exam = position.is_last_in_module
            && position.module_has_quiz
            && outline.is_last_module(position.module_index);

        Self {
            prev: position
                .index
                .checked_sub(1)
                .and_then(|i| outline.lesson_at(i)),
            next: outline.lesson_at(position.index + 1),
            is_last_in_module: position.is_last_in_module,
            module_has_quiz: position.module_has_quiz,
            is_final_exam,
        }
    }

    pub(crate) fn closed() -> Self {
        Self {
            prev: None,
            next: None,
            is_last_in_module: false,
            module_has_quiz: false,
            is_final_exam: false,
        }
    }

    /// True when the forward action must surface the module quiz instead of
    /// the next lesson.
    #[must_use]
    pub fn quiz_gates_forward(&self) -> bool {
        self.is_last_in_module && self.module_has_quiz
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
