//! Task reference grammar
//!
//! A task reference is the raw string written in a `deps` entry or a
//! `run` task step: a task name, optionally qualified with an include
//! prefix (`utils:lint`). Parsing is pure string work with no I/O.

use std::fmt;

use serde::Serialize;

/// A parsed task reference.
///
/// The raw string is split on the *first* `:` only. A nested reference
/// like `a:b:build` parses to prefix `a` and name `b:build`; the
/// resolver re-parses the remainder as it descends one include level
/// at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskReference {
    /// Include prefix, when the reference crosses a file boundary.
    pub include_prefix: Option<String>,

    /// Task name, or the unsplit remainder for nested references.
    pub task_name: String,
}

impl TaskReference {
    /// Parses a raw reference string.
    ///
    /// Total and deterministic: every input produces a reference, an
    /// empty input producing an empty task name. Callers are expected
    /// to hand in trimmed text; blank occurrences are their concern.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, rest)) => Self {
                include_prefix: Some(prefix.to_string()),
                task_name: rest.to_string(),
            },
            None => Self {
                include_prefix: None,
                task_name: raw.to_string(),
            },
        }
    }

    /// Returns a reference to a local task with no prefix.
    pub fn local(task_name: impl Into<String>) -> Self {
        Self {
            include_prefix: None,
            task_name: task_name.into(),
        }
    }

    /// Returns true if the reference carries an include prefix.
    pub fn is_qualified(&self) -> bool {
        self.include_prefix.is_some()
    }
}

impl fmt::Display for TaskReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.include_prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.task_name),
            None => write!(f, "{}", self.task_name),
        }
    }
}

/// Joins a namespace path and a local task name into a qualified name.
///
/// An empty path yields the bare name, so root tasks surface unprefixed.
pub fn qualified_name(prefix_path: &[String], name: &str) -> String {
    if prefix_path.is_empty() {
        name.to_string()
    } else {
        format!("{}:{}", prefix_path.join(":"), name)
    }
}
