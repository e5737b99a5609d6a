mod navigation;
mod progress;
mod state;
mod unlock;
mod view;
mod workflow;

// Public API of the player subsystem.
pub use crate::error::PlayerError;
pub use navigation::LessonNavigation;
pub use progress::{CourseProgress, ModuleProgress, ProgressSummary};
pub use state::{CompletionOutcome, PlayerState};
pub use unlock::{LessonUnlock, is_unlocked, unlock_states};
pub use view::{ForwardAction, PlayerView};
pub use workflow::PlayerLoopService;
