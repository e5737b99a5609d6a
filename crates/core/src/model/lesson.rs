use thiserror::Error;
use url::Url;

use crate::model::ids::{LessonId, ModuleId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("resource label cannot be empty")]
    EmptyResourceLabel,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Content type of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonKind {
    Video,
    Text,
}

impl LessonKind {
    /// Stable string form used by storage adapters.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonKind::Video => "video",
            LessonKind::Text => "text",
        }
    }

    /// Parses the stable string form, defaulting unknown values to `Text`.
    ///
    /// Unknown kinds come from older rows; treating them as text keeps the
    /// rendering path alive.
    #[must_use]
    pub fn from_str_lossy(raw: &str) -> Self {
        match raw {
            "video" => LessonKind::Video,
            _ => LessonKind::Text,
        }
    }
}

/// A downloadable or linked resource attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonResource {
    label: String,
    target: Url,
}

impl LessonResource {
    /// Creates a resource with a non-empty label.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyResourceLabel` if the label is blank.
    pub fn new(label: impl Into<String>, target: Url) -> Result<Self, LessonError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(LessonError::EmptyResourceLabel);
        }
        Ok(Self { label, target })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn target(&self) -> &Url {
        &self.target
    }
}

/// A single lesson inside a module.
///
/// Lessons are read-only inputs to the progression engine; the authoring
/// system owns their content and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    module_id: ModuleId,
    title: String,
    kind: LessonKind,
    order: u32,
    duration_secs: Option<u32>,
    resources: Vec<LessonResource>,
}

impl Lesson {
    /// Creates a lesson with a validated title.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        module_id: ModuleId,
        title: impl Into<String>,
        kind: LessonKind,
        order: u32,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        Ok(Self {
            id,
            module_id,
            title,
            kind,
            order,
            duration_secs: None,
            resources: Vec::new(),
        })
    }

    /// Attach an optional duration in seconds.
    #[must_use]
    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Attach linked resources.
    #[must_use]
    pub fn with_resources(mut self, resources: Vec<LessonResource>) -> Self {
        self.resources = resources;
        self
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
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
    pub fn kind(&self) -> LessonKind {
        self.kind
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }

    #[must_use]
    pub fn resources(&self) -> &[LessonResource] {
        &self.resources
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
