use thiserror::Error;

use crate::model::{CourseError, LessonError, ModuleError, QuizError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}
