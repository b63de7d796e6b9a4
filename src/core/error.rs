//! Pipeline error taxonomy

use thiserror::Error;

use super::RunState;

/// Errors raised by the graph and the coordinator
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A registered task names a dependency that was never registered
    #[error("Task {task} depends on {dependency}, but {dependency} is not registered")]
    MissingDependency { task: String, dependency: String },

    /// The dependency graph contains a cycle through `task`
    #[error("Circular dependency detected at {task}")]
    CircularDependency { task: String },

    /// A task's `execute` failed; the underlying error is kept unchanged
    #[error("Task {task} failed")]
    TaskExecutionFailure {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    /// Lookup of a task name that is not in the graph
    #[error("Task not found: {task}")]
    TaskNotFound { task: String },

    /// `execute` was called on a coordinator that has already run
    #[error("Pipeline is {state}; call reset() before running it again")]
    RunNotIdle { state: RunState },
}

impl PipelineError {
    /// Name of the task this error is about, if any
    pub fn task(&self) -> Option<&str> {
        match self {
            Self::MissingDependency { task, .. }
            | Self::CircularDependency { task }
            | Self::TaskExecutionFailure { task, .. }
            | Self::TaskNotFound { task } => Some(task),
            Self::RunNotIdle { .. } => None,
        }
    }
}
