//! Resolved task graph
//!
//! Expands a root document and its includes into a tree of namespaces,
//! guarding against include cycles and unbounded nesting. Building may
//! touch the filesystem through the loader; the resulting graph is an
//! immutable snapshot.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, warn};

use super::document::{ConfigDocument, DocLocation, IncludeRecord};
use super::loader::DocumentLoader;
use super::reference::qualified_name;

/// Maximum include nesting below the root document.
///
/// Bounds pathological chains that never revisit a file and so never
/// trip the visited-set cycle check.
pub const MAX_INCLUDE_DEPTH: usize = 10;

/// An include entry of a built graph: the record as written, plus the
/// expanded target when resolution succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeNode {
    record: IncludeRecord,
    subgraph: Option<ResolvedTaskGraph>,
}

impl IncludeNode {
    pub fn record(&self) -> &IncludeRecord {
        &self.record
    }

    /// The expanded target, absent when the include's path was missing,
    /// unparsable, cyclic, or past the depth limit.
    pub fn subgraph(&self) -> Option<&ResolvedTaskGraph> {
        self.subgraph.as_ref()
    }
}

/// The fully expanded tree of a root document and its included
/// documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTaskGraph {
    document: ConfigDocument,
    includes: BTreeMap<String, IncludeNode>,
}

impl ResolvedTaskGraph {
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// The expanded subgraph under `prefix`, if that include resolved.
    pub fn subgraph(&self, prefix: &str) -> Option<&ResolvedTaskGraph> {
        self.includes.get(prefix).and_then(IncludeNode::subgraph)
    }

    pub fn include_node(&self, prefix: &str) -> Option<&IncludeNode> {
        self.includes.get(prefix)
    }

    /// Include entries in prefix order.
    pub fn includes(&self) -> impl Iterator<Item = (&str, &IncludeNode)> {
        self.includes.iter().map(|(p, n)| (p.as_str(), n))
    }

    /// Resolved subgraphs in prefix order.
    pub fn subgraphs(&self) -> impl Iterator<Item = (&str, &ResolvedTaskGraph)> {
        self.includes
            .iter()
            .filter_map(|(p, n)| n.subgraph().map(|s| (p.as_str(), s)))
    }

    /// Every reachable task name, nested tasks surfacing qualified
    /// (`prefix:name`, recursively). Cyclic and unresolved branches are
    /// already absent by construction.
    pub fn flatten(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut Vec::new(), &mut names);
        names
    }

    fn collect_names(&self, prefix_path: &mut Vec<String>, names: &mut BTreeSet<String>) {
        for name in self.document.task_names() {
            names.insert(qualified_name(prefix_path, name));
        }
        for (prefix, subgraph) in self.subgraphs() {
            prefix_path.push(prefix.to_string());
            subgraph.collect_names(prefix_path, names);
            prefix_path.pop();
        }
    }

    /// Canonical locations of every document in the graph, root first.
    pub fn locations(&self) -> Vec<DocLocation> {
        let mut locations = vec![self.document.location().clone()];
        for (_, subgraph) in self.subgraphs() {
            locations.extend(subgraph.locations());
        }
        locations
    }

    /// The namespace path leading to the document at `location`, when
    /// it is reachable from this graph. The root document has an empty
    /// path.
    pub fn prefix_path(&self, location: &DocLocation) -> Option<Vec<String>> {
        if self.document.location() == location {
            return Some(Vec::new());
        }
        for (prefix, subgraph) in self.subgraphs() {
            if let Some(mut path) = subgraph.prefix_path(location) {
                path.insert(0, prefix.to_string());
                return Some(path);
            }
        }
        None
    }

    /// The fully qualified name a local task surfaces under, falling
    /// back to the bare name when the document is not reachable.
    pub fn qualified_task_name(&self, location: &DocLocation, local_name: &str) -> String {
        match self.prefix_path(location) {
            Some(path) => qualified_name(&path, local_name),
            None => local_name.to_string(),
        }
    }
}

/// Builds [`ResolvedTaskGraph`]s from a root document.
///
/// One `visited` set of canonical locations is shared across the whole
/// build, so a document reachable via two include paths only expands
/// under the first-discovered prefix; the second occurrence keeps its
/// include record but no subgraph.
pub struct GraphBuilder<'a, L: DocumentLoader + ?Sized> {
    loader: &'a L,
}

impl<'a, L: DocumentLoader + ?Sized> GraphBuilder<'a, L> {
    pub fn new(loader: &'a L) -> Self {
        Self { loader }
    }

    pub fn build(&self, root: ConfigDocument) -> ResolvedTaskGraph {
        let mut visited = HashSet::new();
        visited.insert(root.location().clone());
        self.expand(root, &mut visited, 0)
    }

    fn expand(
        &self,
        document: ConfigDocument,
        visited: &mut HashSet<DocLocation>,
        depth: usize,
    ) -> ResolvedTaskGraph {
        debug!(location = %document.location(), depth, "expanding babfile");

        let mut includes = BTreeMap::new();
        for record in document.includes() {
            let subgraph = self.expand_include(&document, record, visited, depth);
            includes.insert(
                record.prefix.clone(),
                IncludeNode {
                    record: record.clone(),
                    subgraph,
                },
            );
        }

        ResolvedTaskGraph { document, includes }
    }

    fn expand_include(
        &self,
        owner: &ConfigDocument,
        include: &IncludeRecord,
        visited: &mut HashSet<DocLocation>,
        depth: usize,
    ) -> Option<ResolvedTaskGraph> {
        if depth + 1 > MAX_INCLUDE_DEPTH {
            warn!(
                location = %owner.location(),
                prefix = %include.prefix,
                limit = MAX_INCLUDE_DEPTH,
                "maximum include depth exceeded"
            );
            return None;
        }

        let base_dir = owner.location().directory()?;
        let target = self.loader.locate(base_dir, &include.babfile_path);

        if visited.contains(&target) {
            debug!(location = %target, "skipping already visited babfile");
            return None;
        }

        let document = self.loader.load(&target)?;
        visited.insert(target);
        Some(self.expand(document, visited, depth + 1))
    }
}
