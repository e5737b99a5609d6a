#![forbid(unsafe_code)]

pub mod error;
pub mod player;

pub use course_core::Clock;

pub use error::PlayerError;

pub use player::{
    CompletionOutcome, CourseProgress, ForwardAction, LessonNavigation, LessonUnlock,
    ModuleProgress, PlayerLoopService, PlayerState, PlayerView, ProgressSummary,
};
