//! Catalog commands: flat task listing and include tree

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::domain::{qualified_name, ResolvedTaskGraph};
use crate::storage::Workspace;

use super::output::Output;

#[derive(Serialize)]
struct TaskEntry {
    name: String,
    description: Option<String>,
    origin: String,
}

/// Prints the flattened task catalog.
pub fn list(workspace: &Workspace, output: &Output) -> Result<()> {
    let graph = workspace.build_graph()?;

    let mut entries = BTreeMap::new();
    collect_entries(&graph, &mut Vec::new(), &mut entries);

    if output.is_json() {
        output.data(&entries.values().collect::<Vec<_>>());
        return Ok(());
    }

    if entries.is_empty() {
        println!("No tasks found in {}", workspace.root());
        return Ok(());
    }

    println!("{:<32} DESCRIPTION", "TASK");
    println!("{}", "-".repeat(70));
    for entry in entries.values() {
        println!(
            "{:<32} {}",
            entry.name,
            entry.description.as_deref().unwrap_or("")
        );
    }
    println!();
    println!("{} task(s)", entries.len());

    Ok(())
}

fn collect_entries(
    graph: &ResolvedTaskGraph,
    prefix_path: &mut Vec<String>,
    entries: &mut BTreeMap<String, TaskEntry>,
) {
    for task in graph.document().tasks() {
        let name = qualified_name(prefix_path, &task.name);
        entries.insert(
            name.clone(),
            TaskEntry {
                name,
                description: task.description.clone(),
                origin: task.origin.to_string(),
            },
        );
    }
    for (prefix, subgraph) in graph.subgraphs() {
        prefix_path.push(prefix.to_string());
        collect_entries(subgraph, prefix_path, entries);
        prefix_path.pop();
    }
}

#[derive(Serialize)]
struct TreeNode {
    file: String,
    tasks: Vec<TreeTask>,
    includes: Vec<TreeInclude>,
}

#[derive(Serialize)]
struct TreeTask {
    name: String,
    description: Option<String>,
}

#[derive(Serialize)]
struct TreeInclude {
    prefix: String,
    babfile: String,
    resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<TreeNode>,
}

/// Prints the include tree with each document's local tasks.
pub fn tree(workspace: &Workspace, output: &Output) -> Result<()> {
    let graph = workspace.build_graph()?;
    let node = tree_node(&graph);

    if output.is_json() {
        output.data(&node);
        return Ok(());
    }

    print_node(&node, None, 0);
    Ok(())
}

fn tree_node(graph: &ResolvedTaskGraph) -> TreeNode {
    TreeNode {
        file: graph.document().location().to_string(),
        tasks: graph
            .document()
            .tasks()
            .map(|task| TreeTask {
                name: task.name.clone(),
                description: task.description.clone(),
            })
            .collect(),
        includes: graph
            .includes()
            .map(|(prefix, node)| TreeInclude {
                prefix: prefix.to_string(),
                babfile: node.record().babfile_path.clone(),
                resolved: node.subgraph().is_some(),
                target: node.subgraph().map(tree_node),
            })
            .collect(),
    }
}

fn print_node(node: &TreeNode, label: Option<&str>, depth: usize) {
    let indent = "  ".repeat(depth);
    match label {
        Some(label) => println!("{}{}", indent, label),
        None => println!("{}{}", indent, node.file),
    }

    for task in &node.tasks {
        match &task.description {
            Some(description) => println!("{}  {}  {}", indent, task.name, description),
            None => println!("{}  {}", indent, task.name),
        }
    }

    for include in &node.includes {
        match &include.target {
            Some(target) => {
                let label = format!("{} ({})", include.prefix, include.babfile);
                print_node(target, Some(&label), depth + 1);
            }
            None => println!(
                "{}  {} ({}) [unresolved]",
                indent, include.prefix, include.babfile
            ),
        }
    }
}
