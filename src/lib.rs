//! agentflow - dependency-driven agent pipeline
//!
//! Runs a DAG of named tasks in deterministic topological order, feeding
//! each task the published results of the tasks it depends on. The
//! bundled agents use it to generate FAQ, product and comparison pages
//! for a skincare product.

pub mod agents;
pub mod config;
pub mod content;
pub mod core;
pub mod llm;
pub mod output;
pub mod pipeline;

// Re-exports
pub use config::Config;
pub use self::core::{
    Coordinator, FnTask, Graph, InputResolver, PipelineError, ResultStore, RunState, Task,
    TaskEvent,
};
pub use output::OutputWriter;

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
