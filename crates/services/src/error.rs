//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CourseId, QuizError};
use storage::repository::StorageError;

/// Errors emitted by the player workflow.
///
/// The pure engine functions never fail: unlock, aggregation, and navigation
/// queries fall back to a closed/zero view on bad input. Errors only arise
/// at the storage boundary or on invalid quiz submissions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("course {0} not found")]
    CourseNotFound(CourseId),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
