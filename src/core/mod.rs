//! Core engine - task graph, result store and the coordinator that runs them

mod coordinator;
mod error;
mod graph;
mod store;
mod task;

pub use coordinator::{Coordinator, RunState, TaskEvent};
pub use error::PipelineError;
pub use graph::{Graph, Node};
pub use store::ResultStore;
pub use task::{default_input, resolver, FnTask, InputResolver, ResolveContext, Task};
