//! The `watch` command
//!
//! Rebuilds and revalidates the graph whenever a babfile changes.
//! Each change bumps the modification tracker, so the cached graph
//! for the previous token goes stale and the next pass rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;

use crate::domain::DocumentLoader;
use crate::domain::GraphBuilder;
use crate::storage::{GraphCache, ModificationTracker, Workspace};

use super::output::Output;
use super::validate_cmd;

const DEBOUNCE: Duration = Duration::from_millis(500);

pub fn run(workspace: &Workspace, output: &Output) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(DEBOUNCE, tx).context("Failed to start file watcher")?;

    let tracker = ModificationTracker::new();
    let cache = GraphCache::new();

    // Watch the root tree recursively, plus the directory of any
    // document an absolute include pulls in from outside it.
    let root_dir = workspace.root_dir().to_path_buf();
    debouncer
        .watcher()
        .watch(&root_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", root_dir.display()))?;
    for dir in external_document_dirs(workspace, &root_dir) {
        if let Err(err) = debouncer.watcher().watch(&dir, RecursiveMode::NonRecursive) {
            output.error(&format!("Failed to watch {}: {}", dir.display(), err));
        }
    }

    output.line(&format!("Watching {}", root_dir.display()));
    revalidate(workspace, &cache, &tracker, output);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if !events.iter().any(|e| is_babfile_change(&e.path)) {
                    continue;
                }
                tracker.bump();
                output.blank();
                revalidate(workspace, &cache, &tracker, output);
            }
            Ok(Err(error)) => {
                output.error(&format!("Watch error: {:?}", error));
            }
            Err(_) => break,
        }
    }

    Ok(())
}

/// One rebuild-and-report pass. Never fails: a root that stops
/// parsing mid-edit reports and waits for the next change.
fn revalidate(
    workspace: &Workspace,
    cache: &GraphCache,
    tracker: &ModificationTracker,
    output: &Output,
) {
    let root_doc = match workspace.loader().load(workspace.root()) {
        Some(doc) => doc,
        None => {
            output.error(&format!("Failed to parse babfile: {}", workspace.root()));
            return;
        }
    };

    let graph = cache.get_or_build(workspace.root(), tracker.current(), || {
        GraphBuilder::new(workspace.loader()).build(root_doc)
    });

    validate_cmd::report(&graph, output);
}

/// Directories of graph documents living outside the watched root
/// tree, deduplicated.
fn external_document_dirs(workspace: &Workspace, root_dir: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(graph) = workspace.build_graph() {
        for location in graph.locations() {
            let Some(dir) = location.directory() else {
                continue;
            };
            if !dir.starts_with(root_dir) && !dirs.contains(&dir.to_path_buf()) {
                dirs.push(dir.to_path_buf());
            }
        }
    }
    dirs
}

fn is_babfile_change(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}
