//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::storage::{Config, Workspace};

use super::output::{Output, OutputFormat};
use super::{catalog, resolve_cmd, validate_cmd, watch};

#[derive(Parser)]
#[command(name = "babcheck")]
#[command(author, version, about = "Resolver and validator for bab task-runner configuration files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to configuration, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Root babfile to use instead of directory discovery
    #[arg(long, global = true, value_name = "PATH")]
    pub babfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every task reachable from the root babfile
    List,

    /// Show the include tree with each babfile's tasks
    Tree,

    /// Resolve a task reference to its definition
    Resolve {
        /// Reference to resolve, e.g. `build` or `utils:lint`
        reference: String,
    },

    /// Check every dependency and run reference
    Validate,

    /// Show the execution order for a task, dependencies first
    Order {
        /// Qualified task name, e.g. `build` or `utils:lint`
        task: String,
    },

    /// Revalidate whenever a babfile changes
    Watch,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().unwrap_or_default();
    let format = cli
        .format
        .unwrap_or_else(|| config.default_format().into());
    let output = Output::new(format);

    let workspace = open_workspace(cli.babfile.as_deref(), &config)?;

    let ok = match cli.command {
        Commands::List => {
            catalog::list(&workspace, &output)?;
            true
        }
        Commands::Tree => {
            catalog::tree(&workspace, &output)?;
            true
        }
        Commands::Resolve { reference } => resolve_cmd::resolve(&workspace, &output, &reference)?,
        Commands::Validate => validate_cmd::run(&workspace, &output)?,
        Commands::Order { task } => resolve_cmd::order(&workspace, &output, &task)?,
        Commands::Watch => {
            watch::run(&workspace, &output)?;
            true
        }
    };

    if !ok {
        // Data-level failure (unresolved reference, validation issues):
        // already reported, signal through the exit code only.
        std::process::exit(1);
    }

    Ok(())
}

fn open_workspace(babfile: Option<&Path>, config: &Config) -> Result<Workspace> {
    match babfile.or_else(|| config.root_override()) {
        Some(path) => Workspace::open(path),
        None => Workspace::discover_current(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "babcheck=debug" } else { "babcheck=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
