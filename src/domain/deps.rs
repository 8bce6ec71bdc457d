//! Dependency ordering over a resolved task graph
//!
//! Task `deps` lists form their own directed graph, distinct from the
//! include tree. This module projects a [`ResolvedTaskGraph`] onto a
//! petgraph digraph keyed by qualified task names, to answer "what has
//! to run, and in which order" for one task.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use super::graph::ResolvedTaskGraph;
use super::reference::qualified_name;
use super::resolver;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Dependency cycle involving task: {0}")]
    CycleDetected(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

/// Dependency relation between qualified task names.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Edge direction: dependency -> dependent, so topological order
    /// lists prerequisites first.
    graph: DiGraph<String, ()>,

    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Projects every reachable task and every *resolved* dependency
    /// reference of `graph` onto a digraph.
    ///
    /// Occurrences the validator reports as unresolved contribute no
    /// edge; run-step references are execution detail and contribute no
    /// edge either.
    pub fn from_graph(graph: &ResolvedTaskGraph) -> Self {
        let mut deps = Self::default();
        for name in graph.flatten() {
            deps.add_node(name);
        }
        deps.add_edges(graph, &mut Vec::new());
        deps
    }

    fn add_node(&mut self, name: String) -> NodeIndex {
        match self.node_map.get(&name) {
            Some(idx) => *idx,
            None => {
                let idx = self.graph.add_node(name.clone());
                self.node_map.insert(name, idx);
                idx
            }
        }
    }

    fn add_edges(&mut self, node: &ResolvedTaskGraph, prefix_path: &mut Vec<String>) {
        for task in node.document().tasks() {
            let dependent = qualified_name(prefix_path, &task.name);
            for raw in &task.deps {
                let raw = raw.trim();
                if raw.is_empty() || resolver::resolve(node, raw).is_none() {
                    continue;
                }
                // A reference resolves by descending from the declaring
                // node, so its qualified name is the declaring namespace
                // plus the reference text.
                let dependency = qualified_name(prefix_path, raw);
                let dep_idx = self.add_node(dependency);
                let task_idx = self.add_node(dependent.clone());
                self.graph.update_edge(dep_idx, task_idx, ());
            }
        }
        for (prefix, subgraph) in node.subgraphs() {
            prefix_path.push(prefix.to_string());
            self.add_edges(subgraph, prefix_path);
            prefix_path.pop();
        }
    }

    /// Direct dependencies of a task.
    pub fn dependencies(&self, task: &str) -> Vec<String> {
        let idx = match self.node_map.get(task) {
            Some(idx) => *idx,
            None => return vec![],
        };

        let mut names: Vec<String> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter_map(|i| self.graph.node_weight(i).cloned())
            .collect();
        names.sort();
        names
    }

    /// Tasks that directly depend on a task.
    pub fn dependents(&self, task: &str) -> Vec<String> {
        let idx = match self.node_map.get(task) {
            Some(idx) => *idx,
            None => return vec![],
        };

        let mut names: Vec<String> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|i| self.graph.node_weight(i).cloned())
            .collect();
        names.sort();
        names
    }

    /// Execution order for `task`: its transitive dependency closure in
    /// topological order, dependencies first, the task itself last.
    pub fn execution_order(&self, task: &str) -> Result<Vec<String>, GraphError> {
        let start = *self
            .node_map
            .get(task)
            .ok_or_else(|| GraphError::TaskNotFound(task.to_string()))?;

        // Closure over incoming edges; a visited set keeps this finite
        // even when the deps themselves are cyclic.
        let mut closure = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(idx) = queue.pop_front() {
            if !closure.insert(idx) {
                continue;
            }
            queue.extend(
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming),
            );
        }

        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter(|idx| closure.contains(idx))
                .filter_map(|idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(_) => Err(GraphError::CycleDetected(task.to_string())),
        }
    }

    pub fn contains(&self, task: &str) -> bool {
        self.node_map.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}
