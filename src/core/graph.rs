//! Dependency graph - registered tasks, validation and execution order

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::{PipelineError, Task};

/// A registered task together with its declared dependencies
#[derive(Clone)]
pub struct Node {
    pub task: Arc<dyn Task>,
    pub dependencies: Vec<String>,
}

impl Node {
    fn new(task: Arc<dyn Task>) -> Self {
        let dependencies = task.dependencies().to_vec();
        Self { task, dependencies }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("task", &self.task.name())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Task DAG with a cached topological order
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<String, Node>,
    // Registration order; a replaced node keeps its original slot
    names: Vec<String>,
    order: Option<Vec<String>>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task, replacing any node with the same name
    pub fn add_node(&mut self, task: Arc<dyn Task>) {
        let name = task.name().to_string();
        if self.nodes.insert(name.clone(), Node::new(task)).is_some() {
            log::warn!("Task {} registered twice, replacing earlier node", name);
        } else {
            self.names.push(name);
        }
        self.order = None;
    }

    /// Check that every declared dependency is a registered node.
    ///
    /// Cycles are not looked for here; see [`Graph::execution_order`].
    pub fn validate(&self) -> Result<(), PipelineError> {
        for name in &self.names {
            let node = &self.nodes[name];
            if let Some(missing) = node
                .dependencies
                .iter()
                .find(|dep| !self.nodes.contains_key(dep.as_str()))
            {
                return Err(PipelineError::MissingDependency {
                    task: name.clone(),
                    dependency: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Linear order in which every task follows all of its dependencies.
    ///
    /// Computed on first access and cached until the next registration.
    pub fn execution_order(&mut self) -> Result<&[String], PipelineError> {
        if self.order.is_none() {
            let order = self.topological_sort()?;
            log::debug!("Execution order: {}", order.join(" -> "));
            self.order = Some(order);
        }
        Ok(self.order.as_deref().unwrap_or_default())
    }

    /// Depth-first sort; independent tasks keep registration order
    fn topological_sort(&self) -> Result<Vec<String>, PipelineError> {
        let mut visited = HashSet::new();
        let mut in_progress = HashSet::new();
        let mut order = Vec::with_capacity(self.names.len());

        for name in &self.names {
            if !visited.contains(name.as_str()) {
                self.visit(name, &mut visited, &mut in_progress, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        in_progress: &mut HashSet<&'a str>,
        order: &mut Vec<String>,
    ) -> Result<(), PipelineError> {
        if in_progress.contains(name) {
            return Err(PipelineError::CircularDependency {
                task: name.to_string(),
            });
        }
        if visited.contains(name) {
            return Ok(());
        }

        in_progress.insert(name);
        if let Some(node) = self.nodes.get(name) {
            // Unregistered dependencies are left for validate() to report
            for dep in node.dependencies.iter().filter(|d| self.nodes.contains_key(d.as_str())) {
                self.visit(dep, visited, in_progress, order)?;
            }
        }
        in_progress.remove(name);
        visited.insert(name);
        order.push(name.to_string());

        Ok(())
    }

    /// Get task by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Task>> {
        self.nodes.get(name).map(|node| &node.task)
    }

    /// Get task by name, failing with `TaskNotFound`
    pub fn require(&self, name: &str) -> Result<&Arc<dyn Task>, PipelineError> {
        self.get(name).ok_or_else(|| PipelineError::TaskNotFound {
            task: name.to_string(),
        })
    }

    /// Get node by name
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Task names in registration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether an order is currently cached
    pub fn has_cached_order(&self) -> bool {
        self.order.is_some()
    }
}
