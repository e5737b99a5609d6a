mod course;
mod ids;
mod lesson;
mod module;
mod outline;
mod progress;
mod quiz;

pub use ids::{CourseId, LearnerId, LessonId, ModuleId, ParseIdError, QuizId};

pub use course::{Course, CourseError};
pub use lesson::{Lesson, LessonError, LessonKind, LessonResource};
pub use module::{CourseModule, ModuleError};
pub use outline::{CourseOutline, LessonPosition, OutlineModule};
pub use progress::{ProgressMap, ProgressRecord};
pub use quiz::{Quiz, QuizAttempt, QuizError};
