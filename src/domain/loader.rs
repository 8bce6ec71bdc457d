//! Document loading seam
//!
//! The resolver never reads files itself: it consumes already-parsed
//! documents through [`DocumentLoader`]. The filesystem implementation
//! lives in the storage layer; [`MemoryLoader`] serves embedders and
//! tests that hold pre-parsed documents.

use std::collections::HashMap;
use std::path::Path;

use super::document::{ConfigDocument, DocLocation};

/// Supplies configuration documents to the graph builder.
///
/// Implementations must be idempotent and side-effect-free from the
/// resolver's point of view, and a returned document's location must
/// equal the requested one.
pub trait DocumentLoader {
    /// Loads and parses the document at `location`.
    ///
    /// `None` when the location is missing or the content does not
    /// parse as the task/include schema. This is a soft failure: the
    /// include contributes no tasks and the rest of the graph builds
    /// normally.
    fn load(&self, location: &DocLocation) -> Option<ConfigDocument>;

    /// Produces the canonical location for an include path referenced
    /// from `base_dir`.
    ///
    /// A leading `/` denotes an absolute path; anything else resolves
    /// relative to the including document's directory. The default is
    /// purely lexical; filesystem-backed loaders normalize further.
    fn locate(&self, base_dir: &Path, include_path: &str) -> DocLocation {
        if include_path.starts_with('/') {
            DocLocation::new(include_path)
        } else {
            DocLocation::new(base_dir.join(include_path))
        }
    }
}

/// A loader over a fixed set of pre-parsed documents.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    documents: HashMap<DocLocation, ConfigDocument>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document under its own location.
    pub fn insert(&mut self, document: ConfigDocument) -> &mut Self {
        self.documents.insert(document.location().clone(), document);
        self
    }
}

impl DocumentLoader for MemoryLoader {
    fn load(&self, location: &DocLocation) -> Option<ConfigDocument> {
        self.documents.get(location).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullLoader;

    impl DocumentLoader for NullLoader {
        fn load(&self, _location: &DocLocation) -> Option<ConfigDocument> {
            None
        }
    }

    #[test]
    fn locate_relative_path() {
        let loader = NullLoader;
        let location = loader.locate(Path::new("/proj"), "./utils/babfile.yml");
        assert_eq!(location.as_path(), Path::new("/proj/./utils/babfile.yml"));
    }

    #[test]
    fn locate_absolute_path() {
        let loader = NullLoader;
        let location = loader.locate(Path::new("/proj"), "/shared/babfile.yml");
        assert_eq!(location.as_path(), Path::new("/shared/babfile.yml"));
    }

    #[test]
    fn memory_loader_round_trip() {
        let location = DocLocation::new("/proj/babfile.yml");
        let doc = ConfigDocument::new(location.clone(), [], []);

        let mut loader = MemoryLoader::new();
        loader.insert(doc.clone());

        assert_eq!(loader.load(&location), Some(doc));
        assert_eq!(loader.load(&DocLocation::new("/other/babfile.yml")), None);
    }
}
