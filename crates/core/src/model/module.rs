use thiserror::Error;

use crate::model::ids::{CourseId, ModuleId};
use crate::model::lesson::Lesson;
use crate::model::quiz::Quiz;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("quiz belongs to module {quiz_module}, not {module}")]
    ForeignQuiz {
        module: ModuleId,
        quiz_module: ModuleId,
    },

    #[error("lesson belongs to module {lesson_module}, not {module}")]
    ForeignLesson {
        module: ModuleId,
        lesson_module: ModuleId,
    },
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// An ordered group of lessons, optionally terminated by a gating quiz.
///
/// Lessons are kept in lesson-order; duplicate order values are tolerated
/// with a stable sort keyed by `(order, original position)` so the rendering
/// path always sees a total order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseModule {
    id: ModuleId,
    course_id: CourseId,
    title: String,
    order: u32,
    lessons: Vec<Lesson>,
    quiz: Option<Quiz>,
}

impl CourseModule {
    /// Creates a module, sorting the given lessons into lesson-order.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::EmptyTitle` if the title is blank,
    /// `ModuleError::ForeignLesson`/`ForeignQuiz` if a child references a
    /// different module.
    pub fn new(
        id: ModuleId,
        course_id: CourseId,
        title: impl Into<String>,
        order: u32,
        mut lessons: Vec<Lesson>,
        quiz: Option<Quiz>,
    ) -> Result<Self, ModuleError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModuleError::EmptyTitle);
        }
        if let Some(lesson) = lessons.iter().find(|l| l.module_id() != id) {
            return Err(ModuleError::ForeignLesson {
                module: id,
                lesson_module: lesson.module_id(),
            });
        }
        if let Some(quiz) = &quiz {
            if quiz.module_id() != id {
                return Err(ModuleError::ForeignQuiz {
                    module: id,
                    quiz_module: quiz.module_id(),
                });
            }
        }

        // Stable: ties on `order` keep their original position.
        lessons.sort_by_key(Lesson::order);

        Ok(Self {
            id,
            course_id,
            title,
            order,
            lessons,
            quiz,
        })
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Lessons in lesson-order.
    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    /// A module "has a quiz" iff the quiz relation is non-null.
    #[must_use]
    pub fn has_quiz(&self) -> bool {
        self.quiz.is_some()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
