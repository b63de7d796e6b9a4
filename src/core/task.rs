//! Task abstraction - a named async unit of pipeline work

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::ResultStore;

/// A named unit of pipeline work with declared upstream dependencies.
///
/// Inputs and outputs are opaque JSON values; the coordinator decides the
/// shape of the input from the task's dependencies (or from a resolver
/// registered alongside it) and publishes the output under `name()`.
#[async_trait]
pub trait Task: Send + Sync {
    /// Unique task name
    fn name(&self) -> &str;

    /// Names of the tasks whose results this task consumes
    fn dependencies(&self) -> &[String];

    /// Run the task
    async fn execute(&self, input: Value) -> anyhow::Result<Value>;
}

/// What a resolver sees when building a task's input
pub struct ResolveContext<'a> {
    /// Run context supplied by the caller
    pub context: &'a Map<String, Value>,
    /// Results published so far in this run
    pub results: &'a ResultStore,
}

impl ResolveContext<'_> {
    /// Published result of `name`, or `null` if it has not run
    pub fn result(&self, name: &str) -> Value {
        self.results.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Value of a context key, or `null` if unset
    pub fn context_value(&self, key: &str) -> Value {
        self.context.get(key).cloned().unwrap_or(Value::Null)
    }
}

/// Per-task input override
pub type InputResolver = Arc<dyn Fn(&dyn Task, &ResolveContext<'_>) -> Value + Send + Sync>;

/// Wrap a closure as an [`InputResolver`]
pub fn resolver<F>(f: F) -> InputResolver
where
    F: Fn(&dyn Task, &ResolveContext<'_>) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Default arity-based input rule.
///
/// No dependencies: the whole run context. One dependency: that
/// dependency's result as-is. Several: an object keyed by dependency name.
pub fn default_input(task: &dyn Task, ctx: &ResolveContext<'_>) -> Value {
    match task.dependencies() {
        [] => Value::Object(ctx.context.clone()),
        [only] => ctx.result(only),
        deps => Value::Object(
            deps.iter()
                .map(|dep| (dep.clone(), ctx.result(dep)))
                .collect(),
        ),
    }
}

type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>>;
type TaskFn = Box<dyn Fn(Value) -> TaskFuture + Send + Sync>;

/// A task built from a name, a dependency list and an async closure
pub struct FnTask {
    name: String,
    dependencies: Vec<String>,
    run: TaskFn,
}

impl FnTask {
    /// Create a task from an async closure
    pub fn new<F, Fut>(name: impl Into<String>, dependencies: &[&str], run: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            run: Box::new(move |input| -> TaskFuture { Box::pin(run(input)) }),
        }
    }
}

#[async_trait]
impl Task for FnTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn execute(&self, input: Value) -> anyhow::Result<Value> {
        (self.run)(input).await
    }
}

impl std::fmt::Debug for FnTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTask")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
