use course_core::model::{CourseOutline, LessonId, ModuleId, ProgressMap};

/// Completion counts for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleProgress {
    pub module_id: ModuleId,
    pub completed: usize,
    pub total: usize,
}

impl ModuleProgress {
    /// Completion percentage for progress bars. A module with no lessons is
    /// 0%, never a division by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Completion counts summed over the whole course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseProgress {
    pub completed: usize,
    pub total: usize,
}

impl CourseProgress {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Aggregated per-module and course-level progress, useful for UI.
///
/// Recomputable from scratch after every completion event; the incremental
/// [`apply_completion`](Self::apply_completion) patch exists for
/// responsiveness and always equals a full recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSummary {
    modules: Vec<ModuleProgress>,
    course: CourseProgress,
}

impl ProgressSummary {
    /// Recompute all counts from the outline and the progress map.
    ///
    /// Completions for lessons the outline does not know are ignored; they
    /// cannot be attributed to a module and must not skew the totals.
    #[must_use]
    pub fn aggregate(outline: &CourseOutline, progress: &ProgressMap) -> Self {
        let mut modules: Vec<ModuleProgress> = outline
            .modules()
            .iter()
            .map(|m| ModuleProgress {
                module_id: m.module_id,
                completed: 0,
                total: m.lesson_count,
            })
            .collect();

        for position in outline.positions() {
            if progress.is_completed(position.lesson_id) {
                if let Some(module) = modules.get_mut(position.module_index) {
                    module.completed += 1;
                }
            }
        }

        let course = CourseProgress {
            completed: modules.iter().map(|m| m.completed).sum(),
            total: modules.iter().map(|m| m.total).sum(),
        };

        Self { modules, course }
    }

    /// Patch the summary after one newly completed lesson.
    ///
    /// Callers must only invoke this for lessons that actually transitioned
    /// to complete; replays are the caller's concern (`ProgressMap::complete`
    /// reports them). Unknown lessons are ignored, mirroring `aggregate`.
    pub fn apply_completion(&mut self, lesson_id: LessonId, outline: &CourseOutline) {
        let Some(position) = outline.position(lesson_id) else {
            return;
        };
        if let Some(module) = self.modules.get_mut(position.module_index) {
            module.completed += 1;
            self.course.completed += 1;
        }
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleProgress] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, module_id: ModuleId) -> Option<&ModuleProgress> {
        self.modules.iter().find(|m| m.module_id == module_id)
    }

    #[must_use]
    pub fn course(&self) -> CourseProgress {
        self.course
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
