//! The `validate` command

use anyhow::Result;

use crate::domain::{validator, Diagnostic, ResolvedTaskGraph};
use crate::storage::Workspace;

use super::output::Output;

/// Validates every reference in the graph.
///
/// Returns true when the configuration is clean; the caller turns a
/// false into the exit code.
pub fn run(workspace: &Workspace, output: &Output) -> Result<bool> {
    let graph = workspace.build_graph()?;
    Ok(report(&graph, output))
}

/// Prints the validation report for an already-built graph.
pub fn report(graph: &ResolvedTaskGraph, output: &Output) -> bool {
    let issues = validator::issues(graph);

    if output.is_json() {
        output.data(&issues);
        return issues.is_empty();
    }

    if issues.is_empty() {
        println!("No issues found");
        return true;
    }

    for issue in &issues {
        println!("{}", render(issue));
    }
    println!();
    println!("{} issue(s) found", issues.len());

    false
}

fn render(issue: &Diagnostic) -> String {
    format!(
        "{}: task '{}' references '{}' in {}",
        issue.status.message(),
        issue.task,
        issue.reference,
        issue.kind.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReferenceKind, ReferenceStatus};

    #[test]
    fn render_names_task_and_reference() {
        let issue = Diagnostic {
            task: "test".to_string(),
            reference: "missing".to_string(),
            kind: ReferenceKind::Dep,
            status: ReferenceStatus::UnresolvedReference,
        };

        assert_eq!(
            render(&issue),
            "unresolved task reference: task 'test' references 'missing' in deps"
        );
    }
}
