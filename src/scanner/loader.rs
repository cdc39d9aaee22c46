//! Code loaders: resolving namespace prefixes to code units and names to types.
//!
//! A [`CodeLoader`] is the collaborator seam between the scanner and whatever
//! actually hosts compiled type units. It resolves a slash-converted
//! namespace prefix to zero or more resource locations (a prefix may be split
//! across several code units on a search path), and loads fully-qualified
//! names into handles, returning absence rather than failing hard when a name
//! does not resolve to a loadable type.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::metadata::handle::TypeHandle;
use crate::metadata::registry::TypeRegistry;
use crate::Result;

/// Default file extension marking a compiled-type unit.
pub const DEFAULT_UNIT_EXTENSION: &str = "class";

/// A code unit resolved for a namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    /// A directory of compiled type files. The path is the directory
    /// corresponding to the prefix itself; everything beneath it belongs to
    /// the namespace.
    Directory(PathBuf),
    /// A bundled archive; entries are filtered by the prefix during the scan.
    Archive(PathBuf),
}

/// Resolves namespace prefixes to code units and fully-qualified names to types.
pub trait CodeLoader: Send + Sync {
    /// A process-unique identity for this loader.
    ///
    /// Scan results are memoized per `(loader_id, prefix)`; two distinct
    /// loaders must never share an id, so implementations should take theirs
    /// from [`next_loader_id`] rather than derive it from a hash.
    fn loader_id(&self) -> u64;

    /// Resolve a slash-converted namespace prefix (`a/b/c`) to the code
    /// units that define types under it.
    ///
    /// # Errors
    /// I/O failures while probing the search path.
    fn resources(&self, prefix_path: &str) -> Result<Vec<ResourceLocation>>;

    /// Load a fully-qualified name into a handle.
    ///
    /// Returns `None` when the name does not resolve to a loadable type;
    /// scans treat that as non-fatal and skip the name.
    fn load_type(&self, fully_qualified_name: &str) -> Option<TypeHandle>;

    /// File extension marking a compiled-type unit.
    fn unit_extension(&self) -> &str {
        DEFAULT_UNIT_EXTENSION
    }
}

static NEXT_LOADER_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique loader id.
#[must_use]
pub fn next_loader_id() -> u64 {
    NEXT_LOADER_ID.fetch_add(1, Ordering::Relaxed)
}

/// A [`CodeLoader`] over a search path of directories and archive files,
/// resolving loads against a shared [`TypeRegistry`].
pub struct SearchPathLoader {
    id: u64,
    registry: Arc<TypeRegistry>,
    search_path: Vec<PathBuf>,
}

impl SearchPathLoader {
    /// Create a loader over the given search path.
    ///
    /// Directory entries contribute their `entry/prefix_path` subdirectory
    /// when it exists; file entries are treated as archives.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>, search_path: Vec<PathBuf>) -> Self {
        SearchPathLoader {
            id: next_loader_id(),
            registry,
            search_path,
        }
    }
}

impl CodeLoader for SearchPathLoader {
    fn loader_id(&self) -> u64 {
        self.id
    }

    fn resources(&self, prefix_path: &str) -> Result<Vec<ResourceLocation>> {
        let mut locations = Vec::new();
        for entry in &self.search_path {
            if entry.is_dir() {
                let candidate = entry.join(prefix_path);
                if candidate.is_dir() {
                    locations.push(ResourceLocation::Directory(candidate));
                }
            } else if entry.is_file() {
                locations.push(ResourceLocation::Archive(entry.clone()));
            }
        }
        Ok(locations)
    }

    fn load_type(&self, fully_qualified_name: &str) -> Option<TypeHandle> {
        self.registry
            .get_by_fullname(fully_qualified_name)
            .map(|descriptor| descriptor.handle)
    }
}
