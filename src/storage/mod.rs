//! # Storage Layer
//!
//! Filesystem and configuration concerns around the resolver core.
//!
//! | Concern | Module | Source |
//! |---------|--------|--------|
//! | Babfile parsing | [`loader`] | YAML (`serde_yaml`) |
//! | Root discovery | [`workspace`] | `babfile.yml` / `babfile.yaml` |
//! | Configuration | [`config`] | TOML, global + `.babcheck.toml` |
//! | Graph caching | [`cache`] | in-memory, token-keyed |
//!
//! The loader implements the [`crate::domain::DocumentLoader`] seam;
//! everything the resolver core knows about the filesystem flows
//! through it.

mod cache;
mod config;
mod loader;
mod workspace;

pub use cache::{GraphCache, ModificationTracker};
pub use config::{Config, ConfigError, FormatPreference, GlobalConfig, ProjectConfig};
pub use loader::{canonical_location, parse_document, FsLoader};
pub use workspace::{find_root_babfile, is_babfile_name, Workspace, WorkspaceError};
