use std::path::PathBuf;

use qc_model::ModuleKind;

/// What happened to one status record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// A report was written to this path.
    Rendered(PathBuf),
    /// The module is not complete; nothing was written.
    Skipped,
    /// Report generation failed with this message.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TaskResult {
    pub module: ModuleKind,
    pub status_file: PathBuf,
    pub outcome: TaskOutcome,
}

#[derive(Debug, Default)]
pub struct RunResult {
    pub bids_id: String,
    pub tasks: Vec<TaskResult>,
}

impl RunResult {
    pub fn new(bids_id: impl Into<String>) -> Self {
        Self {
            bids_id: bids_id.into(),
            tasks: Vec::new(),
        }
    }

    pub fn rendered(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::Rendered(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, predicate: impl Fn(&TaskOutcome) -> bool) -> usize {
        self.tasks
            .iter()
            .filter(|task| predicate(&task.outcome))
            .count()
    }
}
