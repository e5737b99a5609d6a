use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{ModuleId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("passing score must be between 1 and 100, got {0}")]
    InvalidPassingScore(u8),

    #[error("attempt score must be between 0 and 100, got {0}")]
    InvalidAttemptScore(u8),
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// One recorded attempt at a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizAttempt {
    pub score: u8,
    pub passed: bool,
    pub attempted_at: DateTime<Utc>,
}

/// A gating quiz attached to a module.
///
/// Whether this quiz is a "module quiz" or the course's "final exam" is
/// derived from the module's position in the course, never stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    module_id: ModuleId,
    title: String,
    passing_score: u8,
    attempts: Vec<QuizAttempt>,
}

impl Quiz {
    /// Creates a quiz with a validated passing-score threshold (percent).
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidPassingScore` if the threshold is 0 or
    /// above 100.
    pub fn new(
        id: QuizId,
        module_id: ModuleId,
        title: impl Into<String>,
        passing_score: u8,
    ) -> Result<Self, QuizError> {
        if passing_score == 0 || passing_score > 100 {
            return Err(QuizError::InvalidPassingScore(passing_score));
        }
        Ok(Self {
            id,
            module_id,
            title: title.into(),
            passing_score,
            attempts: Vec::new(),
        })
    }

    /// Rehydrate a quiz with its attempt history from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidPassingScore` if the threshold is out of
    /// range.
    pub fn from_persisted(
        id: QuizId,
        module_id: ModuleId,
        title: impl Into<String>,
        passing_score: u8,
        attempts: Vec<QuizAttempt>,
    ) -> Result<Self, QuizError> {
        let mut quiz = Self::new(id, module_id, title, passing_score)?;
        quiz.attempts = attempts;
        Ok(quiz)
    }

    /// Record an attempt, deriving the pass flag from the threshold.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidAttemptScore` if the score exceeds 100.
    pub fn record_attempt(
        &mut self,
        score: u8,
        attempted_at: DateTime<Utc>,
    ) -> Result<QuizAttempt, QuizError> {
        if score > 100 {
            return Err(QuizError::InvalidAttemptScore(score));
        }
        let attempt = QuizAttempt {
            score,
            passed: score >= self.passing_score,
            attempted_at,
        };
        self.attempts.push(attempt);
        Ok(attempt)
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn passing_score(&self) -> u8 {
        self.passing_score
    }

    #[must_use]
    pub fn attempts(&self) -> &[QuizAttempt] {
        &self.attempts
    }

    /// Best score across attempts, if any attempt was made.
    #[must_use]
    pub fn best_score(&self) -> Option<u8> {
        self.attempts.iter().map(|a| a.score).max()
    }

    /// Returns true once any attempt has met the threshold.
    #[must_use]
    pub fn has_passed(&self) -> bool {
        self.attempts.iter().any(|a| a.passed)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
