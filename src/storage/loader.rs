//! Filesystem-backed document loading
//!
//! Parses babfiles from disk into [`ConfigDocument`]s. The schema
//! vocabulary is fixed: top-level `tasks` and `includes` mappings,
//! `desc`/`deps`/`run` per task, `babfile` per include. Everything
//! else is ignored; anything that fails to parse makes the whole
//! document absent, which callers treat as "contributes no tasks".

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use tracing::debug;

use crate::domain::{ConfigDocument, DocLocation, DocumentLoader, IncludeRecord, TaskRecord};

/// Loads configuration documents from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl DocumentLoader for FsLoader {
    fn load(&self, location: &DocLocation) -> Option<ConfigDocument> {
        let content = match fs::read_to_string(location.as_path()) {
            Ok(content) => content,
            Err(err) => {
                debug!(location = %location, %err, "babfile not readable");
                return None;
            }
        };
        parse_document(location.clone(), &content)
    }

    fn locate(&self, base_dir: &Path, include_path: &str) -> DocLocation {
        let joined = if include_path.starts_with('/') {
            PathBuf::from(include_path)
        } else {
            base_dir.join(include_path)
        };
        canonical_location(joined)
    }
}

/// Canonicalizes a path into a document location, falling back to a
/// lexical cleanup when the path does not exist yet.
pub fn canonical_location(path: impl Into<PathBuf>) -> DocLocation {
    let path = path.into();
    match fs::canonicalize(&path) {
        Ok(canonical) => DocLocation::new(canonical),
        Err(_) => DocLocation::new(normalize_lexically(&path)),
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }
    normalized
}

/// Parses babfile content into a document identified by `location`.
///
/// `None` when the content is not valid YAML or does not match the
/// task/include schema.
pub fn parse_document(location: DocLocation, content: &str) -> Option<ConfigDocument> {
    let raw: RawDocument = match serde_yaml::from_str(content) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(location = %location, %err, "babfile did not parse");
            return None;
        }
    };

    let tasks = raw.tasks.0.into_iter().map(|(name, task)| {
        let task = task.unwrap_or_default();
        let mut record = TaskRecord::new(name, location.clone());
        record.description = task.desc;
        record.deps = task.deps.unwrap_or_default();
        record.run_refs = run_task_refs(&task.run.unwrap_or_default());
        record
    }).collect::<Vec<_>>();

    let includes = raw.includes.0.into_iter().filter_map(|(prefix, include)| {
        // An include entry without a babfile path contributes nothing.
        let path = include.and_then(|i| i.babfile)?;
        Some(IncludeRecord::new(prefix, path))
    });

    Some(ConfigDocument::new(location, tasks, includes))
}

/// Extracts `task:` references from run steps, skipping command steps
/// and anything that is not a mapping.
fn run_task_refs(run: &[Value]) -> Vec<String> {
    let key = Value::String("task".to_string());
    run.iter()
        .filter_map(|step| step.as_mapping())
        .filter_map(|mapping| mapping.get(&key))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    tasks: RawTable<RawTask>,
    includes: RawTable<RawInclude>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTask {
    desc: Option<String>,
    deps: Option<Vec<String>>,
    run: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawInclude {
    babfile: Option<String>,
}

/// A `tasks`/`includes` section, kept as an entry list so duplicate
/// keys survive parsing; the last one wins at document construction.
#[derive(Debug)]
struct RawTable<T>(Vec<(String, Option<T>)>);

impl<T> Default for RawTable<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RawTable<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for TableVisitor<T> {
            type Value = RawTable<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of named entries")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawTable::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, Option<T>>()? {
                    entries.push(entry);
                }
                Ok(RawTable(entries))
            }
        }

        deserializer.deserialize_any(TableVisitor(std::marker::PhantomData))
    }
}
