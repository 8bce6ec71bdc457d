//! Reference resolution commands: `resolve` and `order`

use anyhow::Result;

use crate::domain::{resolver, DependencyGraph};
use crate::storage::Workspace;

use super::output::Output;

/// Resolves one reference and prints its target.
///
/// Returns false when the reference does not resolve; the caller turns
/// that into the exit code.
pub fn resolve(workspace: &Workspace, output: &Output, reference: &str) -> Result<bool> {
    let graph = workspace.build_graph()?;
    let reference = reference.trim();

    let record = match resolver::resolve(&graph, reference) {
        Some(record) => record,
        None => {
            output.error(&format!("Unresolved task reference: {}", reference));
            return Ok(false);
        }
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "reference": reference,
            "name": &record.name,
            "origin": record.origin.to_string(),
            "description": &record.description,
            "deps": &record.deps,
        }));
        return Ok(true);
    }

    println!("{}", record.name);
    println!("  origin: {}", record.origin);
    if let Some(description) = &record.description {
        println!("  desc:   {}", description);
    }
    if !record.deps.is_empty() {
        println!("  deps:   {}", record.deps.join(", "));
    }

    Ok(true)
}

/// Prints the execution order for one task, dependencies first.
pub fn order(workspace: &Workspace, output: &Output, task: &str) -> Result<bool> {
    let graph = workspace.build_graph()?;
    let deps = DependencyGraph::from_graph(&graph);

    let order = match deps.execution_order(task.trim()) {
        Ok(order) => order,
        Err(err) => {
            output.error(&err.to_string());
            return Ok(false);
        }
    };

    if output.is_json() {
        output.data(&order);
        return Ok(true);
    }

    for name in &order {
        println!("{}", name);
    }

    Ok(true)
}
