//! Coordinator - drives a pipeline run over the dependency graph
//!
//! Tasks run strictly one at a time in topological order. Each task's
//! future is awaited to completion before the next one starts, and the
//! first failure ends the run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use super::task::default_input;
use super::{Graph, InputResolver, PipelineError, ResolveContext, ResultStore, Task};

/// Lifecycle events emitted during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// Graph validated and ordered, about to run `order`
    RunStarted { order: Vec<String> },
    /// Task input resolved, execution begins
    TaskStarted { task: String },
    /// Task output published
    TaskCompleted { task: String, elapsed_ms: u64 },
    /// Task raised; the run stops here
    TaskFailed { task: String, error: String },
    /// Every task published
    RunCompleted { total: usize },
}

/// Where a run currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    Idle,
    Validating,
    Ordering,
    Running { task: String },
    Completed,
    Failed,
}

impl Default for RunState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Validating => write!(f, "validating"),
            Self::Ordering => write!(f, "ordering"),
            Self::Running { task } => write!(f, "running {}", task),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Pipeline coordinator
#[derive(Default)]
pub struct Coordinator {
    graph: Graph,
    store: ResultStore,
    context: Map<String, Value>,
    resolvers: HashMap<String, InputResolver>,
    state: RunState,
    event_tx: Option<mpsc::UnboundedSender<TaskEvent>>,
}

impl Coordinator {
    /// Create a coordinator with no event subscriber
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a coordinator and the receiving end of its event channel
    pub fn with_events() -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let mut coordinator = Self::new();
        let rx = coordinator.subscribe();
        (coordinator, rx)
    }

    /// Route lifecycle events to a fresh channel, replacing any earlier one
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TaskEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_tx = Some(tx);
        rx
    }

    /// Register a task using the default input rule
    pub fn register_task(&mut self, task: Arc<dyn Task>) {
        self.resolvers.remove(task.name());
        log::debug!("Registered task: {}", task.name());
        self.graph.add_node(task);
    }

    /// Register a task whose input is built by `resolver`
    pub fn register_task_with_resolver(&mut self, task: Arc<dyn Task>, resolver: InputResolver) {
        self.resolvers.insert(task.name().to_string(), resolver);
        log::debug!("Registered task: {} (custom input)", task.name());
        self.graph.add_node(task);
    }

    /// Shallow-merge `partial` into the run context
    pub fn set_context<I>(&mut self, partial: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.context.extend(partial);
    }

    /// Set a single run context key
    pub fn set_context_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.insert(key.into(), value.into());
    }

    /// Current run context
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Current run state
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Underlying dependency graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Validate the graph and return its execution order without running it
    pub fn execution_order(&mut self) -> Result<Vec<String>, PipelineError> {
        self.graph.validate()?;
        Ok(self.graph.execution_order()?.to_vec())
    }

    /// Run every registered task and return all published results.
    ///
    /// The first missing dependency, cycle or task failure ends the run;
    /// tasks ordered after a failing task never start.
    pub async fn execute(&mut self) -> Result<Map<String, Value>, PipelineError> {
        if self.state != RunState::Idle {
            return Err(PipelineError::RunNotIdle {
                state: self.state.clone(),
            });
        }

        match self.run().await {
            Ok(results) => {
                self.state = RunState::Completed;
                log::info!("Pipeline completed ({} tasks)", results.len());
                Ok(results)
            }
            Err(e) => {
                self.state = RunState::Failed;
                log::error!("Pipeline failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run(&mut self) -> Result<Map<String, Value>, PipelineError> {
        self.state = RunState::Validating;
        self.graph.validate()?;

        self.state = RunState::Ordering;
        let order = self.graph.execution_order()?.to_vec();
        log::info!("Execution order: {}", order.join(" -> "));
        self.emit(TaskEvent::RunStarted {
            order: order.clone(),
        });

        for name in &order {
            self.run_task(name).await?;
        }

        self.emit(TaskEvent::RunCompleted { total: order.len() });
        Ok(self.store.snapshot())
    }

    async fn run_task(&mut self, name: &str) -> Result<(), PipelineError> {
        let task = Arc::clone(self.graph.require(name)?);
        self.state = RunState::Running {
            task: name.to_string(),
        };

        let input = self.resolve_input(task.as_ref());

        log::info!("Executing {}...", name);
        self.emit(TaskEvent::TaskStarted {
            task: name.to_string(),
        });
        let started = Instant::now();

        match task.execute(input).await {
            Ok(output) => {
                self.store.publish(name, output);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                log::debug!("{} completed in {}ms", name, elapsed_ms);
                self.emit(TaskEvent::TaskCompleted {
                    task: name.to_string(),
                    elapsed_ms,
                });
                Ok(())
            }
            Err(source) => {
                log::warn!("{} failed: {:#}", name, source);
                self.emit(TaskEvent::TaskFailed {
                    task: name.to_string(),
                    error: format!("{:#}", source),
                });
                Err(PipelineError::TaskExecutionFailure {
                    task: name.to_string(),
                    source,
                })
            }
        }
    }

    /// Input for `task`: its registered resolver, else the arity rule
    fn resolve_input(&self, task: &dyn Task) -> Value {
        let ctx = ResolveContext {
            context: &self.context,
            results: &self.store,
        };
        match self.resolvers.get(task.name()) {
            Some(resolver) => resolver(task, &ctx),
            None => default_input(task, &ctx),
        }
    }

    /// Published result of `name`
    pub fn get_result(&self, name: &str) -> Option<&Value> {
        self.store.get(name)
    }

    /// Results published so far
    pub fn results(&self) -> &ResultStore {
        &self.store
    }

    /// Clear results and context and return to `Idle`.
    ///
    /// Registered tasks and the cached execution order are kept.
    pub fn reset(&mut self) {
        self.store.clear();
        self.context.clear();
        self.state = RunState::Idle;
    }

    fn emit(&self, event: TaskEvent) {
        if let Some(tx) = &self.event_tx {
            // A dropped receiver just means nobody is listening
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{resolver, FnTask};
    use serde_json::json;
    use std::sync::Mutex;

    fn constant(name: &str, deps: &[&str], value: Value) -> Arc<dyn Task> {
        Arc::new(FnTask::new(name, deps, move |_| {
            let value = value.clone();
            async move { Ok(value) }
        }))
    }

    /// Task that records the input it receives
    fn recording(name: &str, deps: &[&str], seen: Arc<Mutex<Vec<Value>>>) -> Arc<dyn Task> {
        Arc::new(FnTask::new(name, deps, move |input| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(input.clone());
                Ok(json!("ok"))
            }
        }))
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TaskEvent>) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let mut coordinator = Coordinator::new();
        coordinator.register_task(constant("P", &[], json!({"v": 1})));
        coordinator.register_task(Arc::new(FnTask::new("Q", &["P"], |input| async move {
            Ok(json!(input["v"].as_i64().unwrap_or(0) + 1))
        })));
        coordinator.register_task(Arc::new(FnTask::new("R", &["P", "Q"], |input| async move {
            Ok(json!({"fromP": input["P"]["v"], "fromQ": input["Q"]}))
        })));

        assert_eq!(coordinator.execution_order().unwrap(), ["P", "Q", "R"]);

        let results = coordinator.execute().await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(coordinator.get_result("Q"), Some(&json!(2)));
        assert_eq!(
            coordinator.get_result("R"),
            Some(&json!({"fromP": 1, "fromQ": 2}))
        );
        assert_eq!(coordinator.state(), &RunState::Completed);
    }

    #[tokio::test]
    async fn test_zero_dependency_task_gets_context() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        coordinator.register_task(recording("root", &[], seen.clone()));
        coordinator.set_context_value("productDataPath", "data/product.json");
        coordinator.set_context_value("locale", "en");
        coordinator.set_context([("locale".to_string(), json!("hi"))]);

        coordinator.execute().await.unwrap();
        assert_eq!(
            seen.lock().unwrap()[0],
            json!({"productDataPath": "data/product.json", "locale": "hi"})
        );
    }

    #[tokio::test]
    async fn test_single_and_multi_dependency_inputs() {
        let seen_single = Arc::new(Mutex::new(Vec::new()));
        let seen_multi = Arc::new(Mutex::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        coordinator.register_task(constant("Y", &[], json!({"y": true})));
        coordinator.register_task(constant("Z", &[], json!([1, 2])));
        coordinator.register_task(recording("single", &["Y"], seen_single.clone()));
        coordinator.register_task(recording("multi", &["Y", "Z"], seen_multi.clone()));

        coordinator.execute().await.unwrap();
        assert_eq!(seen_single.lock().unwrap()[0], json!({"y": true}));
        assert_eq!(
            seen_multi.lock().unwrap()[0],
            json!({"Y": {"y": true}, "Z": [1, 2]})
        );
    }

    #[tokio::test]
    async fn test_resolver_overrides_default() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        coordinator.register_task(constant("parser", &[], json!({"name": "serum"})));
        coordinator.register_task(constant("questions", &["parser"], json!(["q1"])));
        coordinator.register_task_with_resolver(
            recording("faq", &["questions"], seen.clone()),
            resolver(|_, ctx| {
                json!({
                    "product": ctx.result("parser"),
                    "questions": ctx.result("questions"),
                })
            }),
        );

        coordinator.execute().await.unwrap();
        assert_eq!(
            seen.lock().unwrap()[0],
            json!({"product": {"name": "serum"}, "questions": ["q1"]})
        );
    }

    #[tokio::test]
    async fn test_reregistration_drops_resolver() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        coordinator.register_task_with_resolver(
            constant("root", &[], json!(0)),
            resolver(|_, _| json!("custom")),
        );
        coordinator.register_task(recording("root", &[], seen.clone()));
        coordinator.set_context_value("k", 1);

        coordinator.execute().await.unwrap();
        assert_eq!(seen.lock().unwrap()[0], json!({"k": 1}));
    }

    #[tokio::test]
    async fn test_fail_fast() {
        let ran_after = Arc::new(Mutex::new(Vec::new()));
        let (mut coordinator, mut rx) = Coordinator::with_events();
        coordinator.register_task(constant("A", &[], json!("a")));
        coordinator.register_task(Arc::new(FnTask::new("B", &["A"], |_| async {
            Err(anyhow::anyhow!("model unavailable"))
        })));
        coordinator.register_task(recording("C", &["B"], ran_after.clone()));

        let err = coordinator.execute().await.unwrap_err();
        match &err {
            PipelineError::TaskExecutionFailure { task, source } => {
                assert_eq!(task, "B");
                assert_eq!(source.to_string(), "model unavailable");
            }
            other => panic!("expected task failure, got {other:?}"),
        }

        assert_eq!(coordinator.get_result("A"), Some(&json!("a")));
        assert!(coordinator.get_result("B").is_none());
        assert!(coordinator.get_result("C").is_none());
        assert!(ran_after.lock().unwrap().is_empty());
        assert_eq!(coordinator.state(), &RunState::Failed);

        let events = drain(&mut rx);
        assert_eq!(
            events.last(),
            Some(&TaskEvent::TaskFailed {
                task: "B".to_string(),
                error: "model unavailable".to_string(),
            })
        );
        assert!(!events
            .iter()
            .any(|e| matches!(e, TaskEvent::TaskStarted { task } if task == "C")));
    }

    #[tokio::test]
    async fn test_missing_dependency_aborts_before_running() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        coordinator.register_task(recording("root", &[], seen.clone()));
        coordinator.register_task(constant("faq", &["questions"], json!(null)));

        let err = coordinator.execute().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingDependency { ref task, ref dependency }
                if task == "faq" && dependency == "questions"
        ));
        assert!(seen.lock().unwrap().is_empty());
        assert!(coordinator.results().is_empty());
    }

    #[tokio::test]
    async fn test_cycle_aborts_before_running() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        coordinator.register_task(recording("free", &[], seen.clone()));
        coordinator.register_task(constant("A", &["B"], json!(null)));
        coordinator.register_task(constant("B", &["A"], json!(null)));

        let err = coordinator.execute().await.unwrap_err();
        assert!(matches!(err, PipelineError::CircularDependency { .. }));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(coordinator.state(), &RunState::Failed);
    }

    #[tokio::test]
    async fn test_rerun_requires_reset() {
        let mut coordinator = Coordinator::new();
        coordinator.register_task(constant("A", &[], json!(1)));
        coordinator.set_context_value("k", "v");
        coordinator.execute().await.unwrap();

        let err = coordinator.execute().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RunNotIdle { state: RunState::Completed }
        ));

        coordinator.reset();
        assert_eq!(coordinator.state(), &RunState::Idle);
        assert!(coordinator.get_result("A").is_none());
        assert!(coordinator.context().is_empty());
        assert!(coordinator.graph().has_cached_order());

        coordinator.execute().await.unwrap();
        assert_eq!(coordinator.get_result("A"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_events_follow_run() {
        let (mut coordinator, mut rx) = Coordinator::with_events();
        coordinator.register_task(constant("A", &[], json!(1)));
        coordinator.register_task(constant("B", &["A"], json!(2)));
        coordinator.execute().await.unwrap();

        let events = drain(&mut rx);
        assert_eq!(
            events.first(),
            Some(&TaskEvent::RunStarted {
                order: vec!["A".to_string(), "B".to_string()],
            })
        );
        let started: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                TaskEvent::TaskStarted { task } => Some(task.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(started, ["A", "B"]);
        assert_eq!(events.last(), Some(&TaskEvent::RunCompleted { total: 2 }));
    }

    #[test]
    fn test_event_serialization() {
        let event = TaskEvent::TaskCompleted {
            task: "A".to_string(),
            elapsed_ms: 5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            json!({"type": "task_completed", "task": "A", "elapsed_ms": 5})
        );
    }
}
