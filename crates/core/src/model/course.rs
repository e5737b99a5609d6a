use thiserror::Error;

use crate::model::ids::{CourseId, ModuleId};
use crate::model::module::CourseModule;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("module belongs to course {module_course}, not {course}")]
    ForeignModule {
        course: CourseId,
        module_course: CourseId,
    },
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A course: an ordered tree of modules, each holding ordered lessons and an
/// optional gating quiz. Read-only input to the progression engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    modules: Vec<CourseModule>,
}

impl Course {
    /// Creates a course, sorting the given modules into course-order.
    ///
    /// Duplicate module order values are tolerated with a stable sort, same
    /// as lesson ordering inside a module.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is blank, or
    /// `CourseError::ForeignModule` if a module references another course.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        mut modules: Vec<CourseModule>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        if let Some(module) = modules.iter().find(|m| m.course_id() != id) {
            return Err(CourseError::ForeignModule {
                course: id,
                module_course: module.course_id(),
            });
        }

        modules.sort_by_key(CourseModule::order);

        Ok(Self { id, title, modules })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Modules in course-order.
    #[must_use]
    pub fn modules(&self) -> &[CourseModule] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<&CourseModule> {
        self.modules.iter().find(|m| m.id() == id)
    }

    /// Total lesson count across all modules.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(CourseModule::lesson_count).sum()
    }

    /// The last module in course-order, if any.
    #[must_use]
    pub fn last_module(&self) -> Option<&CourseModule> {
        self.modules.last()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_module(id: u64, course: u64, order: u32) -> CourseModule {
        CourseModule::new(
            ModuleId::new(id),
            CourseId::new(course),
            format!("Module {id}"),
            order,
            Vec::new(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn course_sorts_modules_by_order() {
        let modules = vec![
            build_module(2, 1, 2),
            build_module(3, 1, 3),
            build_module(1, 1, 1),
        ];
        let course = Course::new(CourseId::new(1), "Course", modules).unwrap();
        let ids: Vec<u64> = course.modules().iter().map(|m| m.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(course.last_module().unwrap().id(), ModuleId::new(3));
    }

    #[test]
    fn course_rejects_blank_title() {
        let err = Course::new(CourseId::new(1), "  ", Vec::new()).unwrap_err();
        assert!(matches!(err, CourseError::EmptyTitle));
    }

    #[test]
    fn course_rejects_foreign_module() {
        let modules = vec![build_module(1, 2, 1)];
        let err = Course::new(CourseId::new(1), "Course", modules).unwrap_err();
        assert!(matches!(err, CourseError::ForeignModule { .. }));
    }
}
