//! Reference resolution across include boundaries
//!
//! Locates the task a reference string points at, peeling one include
//! prefix per level: `a:b:build` descends into `a`'s subgraph and
//! re-parses `b:build` there. Failures are absence, never errors.

use std::collections::HashSet;

use super::document::{DocLocation, TaskRecord};
use super::graph::ResolvedTaskGraph;
use super::reference::TaskReference;

/// Resolves a raw reference string against a graph.
pub fn resolve<'g>(graph: &'g ResolvedTaskGraph, raw: &str) -> Option<&'g TaskRecord> {
    resolve_reference(graph, &TaskReference::parse(raw))
}

/// Resolves a parsed reference against a graph.
///
/// Tracks its own visited set, independent of the one the builder used,
/// so a graph in which the same document is somehow reachable twice
/// still resolves in finite time instead of looping.
pub fn resolve_reference<'g>(
    graph: &'g ResolvedTaskGraph,
    reference: &TaskReference,
) -> Option<&'g TaskRecord> {
    let mut visited = HashSet::new();
    resolve_inner(graph, reference, &mut visited)
}

fn resolve_inner<'g>(
    graph: &'g ResolvedTaskGraph,
    reference: &TaskReference,
    visited: &mut HashSet<DocLocation>,
) -> Option<&'g TaskRecord> {
    if !visited.insert(graph.document().location().clone()) {
        return None;
    }

    match &reference.include_prefix {
        None => graph.document().task(&reference.task_name),
        Some(prefix) => {
            // Covers both "prefix not in the include table" and
            // "include did not resolve": either way there is no
            // subgraph to descend into.
            let subgraph = graph.subgraph(prefix)?;
            resolve_inner(subgraph, &TaskReference::parse(&reference.task_name), visited)
        }
    }
}
