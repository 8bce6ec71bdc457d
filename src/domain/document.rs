//! In-memory model of a loaded configuration document
//!
//! A babfile parses into a [`ConfigDocument`]: a task table and an
//! include table, identified by the file's canonical location.
//! Documents are immutable snapshots; an edit produces a fresh parse.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Canonical location of a configuration document.
///
/// The normalized, comparison-stable identity used for cycle and
/// visited tracking across the include graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocLocation(PathBuf);

impl DocLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Directory that relative include paths resolve against.
    pub fn directory(&self) -> Option<&Path> {
        self.0.parent()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|n| n.to_str())
    }
}

impl fmt::Display for DocLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for DocLocation {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Where on a task a reference occurrence appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// An entry of the task's `deps` list.
    Dep,
    /// A `task:` step of the task's `run` section.
    RunTask,
}

impl ReferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Dep => "deps",
            ReferenceKind::RunTask => "run.task",
        }
    }
}

/// A single named task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub name: String,

    pub description: Option<String>,

    /// Raw dependency reference strings, in file order.
    pub deps: Vec<String>,

    /// Raw `task:` references from the run section, in file order.
    pub run_refs: Vec<String>,

    /// Location of the owning document. Reporting and navigation only;
    /// resolution logic never looks at it.
    pub origin: DocLocation,
}

impl TaskRecord {
    pub fn new(name: impl Into<String>, origin: DocLocation) -> Self {
        Self {
            name: name.into(),
            description: None,
            deps: Vec::new(),
            run_refs: Vec::new(),
            origin,
        }
    }

    /// All reference occurrences on this task, dependency entries first.
    pub fn references(&self) -> impl Iterator<Item = (ReferenceKind, &str)> {
        self.deps
            .iter()
            .map(|r| (ReferenceKind::Dep, r.as_str()))
            .chain(self.run_refs.iter().map(|r| (ReferenceKind::RunTask, r.as_str())))
    }
}

/// A named include of another configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeRecord {
    /// Namespace prefix the included tasks surface under.
    pub prefix: String,

    /// Path to the included babfile: absolute when it starts with `/`,
    /// otherwise relative to the owning document's directory.
    pub babfile_path: String,
}

impl IncludeRecord {
    pub fn new(prefix: impl Into<String>, babfile_path: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            babfile_path: babfile_path.into(),
        }
    }
}

/// One loaded configuration document: task table plus include table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDocument {
    location: DocLocation,
    tasks: BTreeMap<String, TaskRecord>,
    includes: BTreeMap<String, IncludeRecord>,
}

impl ConfigDocument {
    /// Builds a document from parsed records.
    ///
    /// Duplicate task names or include prefixes keep the later record
    /// (last-write-wins, matching YAML map overwrite); empty names are
    /// dropped.
    pub fn new(
        location: DocLocation,
        tasks: impl IntoIterator<Item = TaskRecord>,
        includes: impl IntoIterator<Item = IncludeRecord>,
    ) -> Self {
        let mut task_table = BTreeMap::new();
        for task in tasks {
            if !task.name.is_empty() {
                task_table.insert(task.name.clone(), task);
            }
        }

        let mut include_table = BTreeMap::new();
        for include in includes {
            if !include.prefix.is_empty() {
                include_table.insert(include.prefix.clone(), include);
            }
        }

        Self {
            location,
            tasks: task_table,
            includes: include_table,
        }
    }

    pub fn location(&self) -> &DocLocation {
        &self.location
    }

    pub fn task(&self, name: &str) -> Option<&TaskRecord> {
        self.tasks.get(name)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.values()
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn include(&self, prefix: &str) -> Option<&IncludeRecord> {
        self.includes.get(prefix)
    }

    pub fn includes(&self) -> impl Iterator<Item = &IncludeRecord> {
        self.includes.values()
    }

    pub fn include_prefixes(&self) -> impl Iterator<Item = &str> {
        self.includes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.includes.is_empty()
    }
}
