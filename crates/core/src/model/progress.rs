use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::LessonId;

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Completion state for one lesson.
///
/// Records are created implicitly: a lesson with no record is simply not
/// completed. Once set, completion never reverts through normal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    #[must_use]
    pub fn completed(at: DateTime<Utc>) -> Self {
        Self {
            is_completed: true,
            completed_at: Some(at),
        }
    }
}

/// A learner's completion map for one course: lesson id → record.
///
/// This is a plain value; the engine's pure functions take it by reference
/// and the only mutation is `complete`, which is idempotent and monotonic.
/// Replaying a completion (a retried request, a second tab) keeps the map
/// equivalent, so at-least-once delivery is safe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMap {
    records: HashMap<LessonId, ProgressRecord>,
}

impl ProgressMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a map from persisted completion timestamps.
    #[must_use]
    pub fn from_completions(completions: impl IntoIterator<Item = (LessonId, DateTime<Utc>)>) -> Self {
        let records = completions
            .into_iter()
            .map(|(lesson, at)| (lesson, ProgressRecord::completed(at)))
            .collect();
        Self { records }
    }

    /// Returns true if the lesson has a completed record.
    #[must_use]
    pub fn is_completed(&self, lesson_id: LessonId) -> bool {
        self.records
            .get(&lesson_id)
            .is_some_and(|r| r.is_completed)
    }

    #[must_use]
    pub fn record(&self, lesson_id: LessonId) -> Option<&ProgressRecord> {
        self.records.get(&lesson_id)
    }

    /// Number of completed lessons in the map.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.records.values().filter(|r| r.is_completed).count()
    }

    /// Mark a lesson complete. Returns true if it was newly completed.
    ///
    /// Idempotent: completing an already-completed lesson leaves the map
    /// unchanged (the original `completed_at` is kept) and returns false.
    /// Deliberately does not consult the unlock policy; callers gate access,
    /// and out-of-order writes (manual credit grants) stay legal.
    pub fn complete(&mut self, lesson_id: LessonId, at: DateTime<Utc>) -> bool {
        if self.is_completed(lesson_id) {
            return false;
        }
        self.records
            .insert(lesson_id, ProgressRecord::completed(at));
        true
    }

    /// Remove a completion record. Only the reconcile path uses this, to
    /// revert an optimistic local completion after an explicit persistence
    /// failure.
    pub fn revert(&mut self, lesson_id: LessonId) {
        self.records.remove(&lesson_id);
    }

    /// Iterate over completed lessons and their timestamps.
    pub fn completions(&self) -> impl Iterator<Item = (LessonId, &ProgressRecord)> + '_ {
        self.records
            .iter()
            .filter(|(_, r)| r.is_completed)
            .map(|(id, r)| (*id, r))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
