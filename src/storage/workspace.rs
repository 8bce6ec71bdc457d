//! Workspace discovery
//!
//! Locates the root babfile and bundles it with the loader as the
//! entry point the CLI works from.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::{DocLocation, DocumentLoader, GraphBuilder, ResolvedTaskGraph};

use super::loader::{canonical_location, FsLoader};

/// Root file names, in preference order.
const ROOT_FILE_NAMES: [&str; 2] = ["babfile.yml", "babfile.yaml"];

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("No babfile found in {0} or any parent directory")]
    RootNotFound(PathBuf),

    #[error("Babfile does not exist: {0}")]
    Missing(PathBuf),
}

/// A directory tree rooted at a babfile.
pub struct Workspace {
    root: DocLocation,
    loader: FsLoader,
}

impl Workspace {
    /// Opens the workspace rooted at an explicit babfile path.
    pub fn open(babfile: impl Into<PathBuf>) -> Result<Self> {
        let path = babfile.into();
        if !path.is_file() {
            return Err(WorkspaceError::Missing(path).into());
        }
        Ok(Self {
            root: canonical_location(path),
            loader: FsLoader,
        })
    }

    /// Walks up from `start` until a directory contains a root babfile.
    pub fn discover(start: impl Into<PathBuf>) -> Result<Self> {
        let start = start.into();
        let mut current = start.clone();
        loop {
            if let Some(found) = find_root_babfile(&current) {
                return Self::open(found);
            }
            if !current.pop() {
                return Err(WorkspaceError::RootNotFound(start).into());
            }
        }
    }

    /// Discovers the workspace from the current directory.
    pub fn discover_current() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::discover(cwd)
    }

    /// Canonical location of the root babfile.
    pub fn root(&self) -> &DocLocation {
        &self.root
    }

    /// Directory containing the root babfile.
    pub fn root_dir(&self) -> &Path {
        self.root.directory().unwrap_or_else(|| Path::new("."))
    }

    pub fn loader(&self) -> &FsLoader {
        &self.loader
    }

    /// Loads the root document and expands the full graph.
    ///
    /// Only a missing or unparsable *root* is an error; failures
    /// further down degrade into prefixes without tasks.
    pub fn build_graph(&self) -> Result<ResolvedTaskGraph> {
        let root = self
            .loader
            .load(&self.root)
            .with_context(|| format!("Failed to parse babfile: {}", self.root))?;
        Ok(GraphBuilder::new(&self.loader).build(root))
    }
}

/// Picks the root babfile of a directory: `babfile.yml` wins over
/// `babfile.yaml`, both case-insensitive.
pub fn find_root_babfile(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(is_babfile_name)
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    for preferred in ROOT_FILE_NAMES {
        if let Some(found) = candidates.iter().find(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.eq_ignore_ascii_case(preferred))
                .unwrap_or(false)
        }) {
            return Some(found.clone());
        }
    }
    candidates.into_iter().next()
}

/// Returns true for file names the root discovery recognizes.
pub fn is_babfile_name(name: &str) -> bool {
    ROOT_FILE_NAMES
        .iter()
        .any(|candidate| name.eq_ignore_ascii_case(candidate))
}
