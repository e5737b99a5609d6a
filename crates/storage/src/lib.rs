#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{CourseRepository, InMemoryRepository, ProgressRepository, StorageError};
pub use sqlite::{SqliteInitError, SqliteRepository};
