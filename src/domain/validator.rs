//! Reference validation
//!
//! Classifies every dependency and run-time task reference in a graph.
//! Classifications are data, not errors: a half-edited babfile is an
//! expected steady state and must keep producing a usable report.

use serde::Serialize;

use super::document::ReferenceKind;
use super::graph::ResolvedTaskGraph;
use super::reference::{qualified_name, TaskReference};
use super::resolver;

/// Classification of one reference occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    /// Resolves to a task and is not a self-dependency.
    Valid,
    /// An unprefixed reference to the declaring task itself. Takes
    /// priority over the unresolved classes.
    SelfDependency,
    /// The prefix is not in the declaring document's include table, or
    /// its include did not resolve.
    UnresolvedInclude,
    /// Fails to resolve for any other reason.
    UnresolvedReference,
}

impl ReferenceStatus {
    pub fn message(&self) -> &'static str {
        match self {
            ReferenceStatus::Valid => "ok",
            ReferenceStatus::SelfDependency => "task depends on itself",
            ReferenceStatus::UnresolvedInclude => "unresolved include",
            ReferenceStatus::UnresolvedReference => "unresolved task reference",
        }
    }
}

/// One classified reference occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Qualified name of the task declaring the reference.
    pub task: String,

    /// The reference string as written (trimmed).
    pub reference: String,

    /// Whether the occurrence sits in `deps` or in a `run` step.
    pub kind: ReferenceKind,

    pub status: ReferenceStatus,
}

impl Diagnostic {
    pub fn is_issue(&self) -> bool {
        self.status != ReferenceStatus::Valid
    }
}

/// Classifies every reference occurrence reachable from `graph`,
/// walking included documents under their qualified names.
pub fn validate(graph: &ResolvedTaskGraph) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    visit(graph, &mut Vec::new(), &mut diagnostics);
    diagnostics
}

/// Like [`validate`], keeping only problematic occurrences.
pub fn issues(graph: &ResolvedTaskGraph) -> Vec<Diagnostic> {
    let mut diagnostics = validate(graph);
    diagnostics.retain(Diagnostic::is_issue);
    diagnostics
}

fn visit(node: &ResolvedTaskGraph, prefix_path: &mut Vec<String>, out: &mut Vec<Diagnostic>) {
    for task in node.document().tasks() {
        for (kind, raw) in task.references() {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            out.push(Diagnostic {
                task: qualified_name(prefix_path, &task.name),
                reference: raw.to_string(),
                kind,
                status: classify(node, &task.name, raw),
            });
        }
    }
    for (prefix, subgraph) in node.subgraphs() {
        prefix_path.push(prefix.to_string());
        visit(subgraph, prefix_path, out);
        prefix_path.pop();
    }
}

fn classify(node: &ResolvedTaskGraph, declaring_task: &str, raw: &str) -> ReferenceStatus {
    let reference = TaskReference::parse(raw);

    match &reference.include_prefix {
        // Self-dependency wins even when the name would resolve.
        None if reference.task_name == declaring_task => ReferenceStatus::SelfDependency,
        None => {
            if node.document().task(&reference.task_name).is_some() {
                ReferenceStatus::Valid
            } else {
                ReferenceStatus::UnresolvedReference
            }
        }
        Some(prefix) => {
            if node.document().include(prefix).is_none() || node.subgraph(prefix).is_none() {
                return ReferenceStatus::UnresolvedInclude;
            }
            if resolver::resolve_reference(node, &reference).is_some() {
                ReferenceStatus::Valid
            } else {
                ReferenceStatus::UnresolvedReference
            }
        }
    }
}
