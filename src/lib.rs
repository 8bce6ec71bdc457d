//! babcheck - Resolver and validator for bab task-runner configuration files
//!
//! A babfile declares named tasks and prefixed includes of further
//! babfiles. This crate expands a root babfile into a namespaced task
//! graph, resolves `prefix:task` references across file boundaries,
//! and classifies broken references - with a CLI on top for listing,
//! inspecting and watching a configuration tree.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{
    ConfigDocument, DependencyGraph, DocLocation, DocumentLoader, GraphBuilder, ResolvedTaskGraph,
    TaskRecord, TaskReference,
};
