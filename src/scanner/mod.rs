//! Namespace scanning over code units.
//!
//! Given a [`CodeLoader`] and a namespace prefix, the scanner enumerates all
//! types defined under that prefix across both directory-based and
//! archive-based code units. A single prefix may resolve to multiple resource
//! locations (split across several code units on the search path); the
//! scanner visits all of them and concatenates the results. Discovery order
//! is not guaranteed stable across runs.
//!
//! Results are memoized in a [`ScanCache`] per `(loader identity, prefix)`
//! pair. Scans are rare, startup-time work whose cost dominates lock
//! contention, so first-time compute-and-insert runs under a coarse mutex;
//! hits are served lock-free from the concurrent map.
//!
//! Individual names that fail to load are skipped rather than aborting the
//! scan - a namespace may enumerate non-type resources - and every skip is
//! counted and recorded for observability.

pub mod loader;

mod archive;
mod directory;

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rayon::prelude::*;

use crate::metadata::handle::TypeHandle;
use crate::scanner::loader::{CodeLoader, ResourceLocation};
use crate::{Error, Result};

/// Append-only record of names that failed to load during scans.
#[derive(Default)]
pub struct SkipLog {
    names: boxcar::Vec<String>,
}

impl SkipLog {
    /// Create an empty skip log.
    #[must_use]
    pub fn new() -> Self {
        SkipLog::default()
    }

    /// Record a skipped fully-qualified name.
    pub fn record(&self, name: &str) {
        self.names.push(name.to_string());
    }

    /// Number of skips recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.names.count()
    }

    /// Snapshot of the skipped names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.names.iter().map(|(_, name)| name.clone()).collect()
    }
}

/// Memoized namespace scans, keyed per `(loader identity, prefix)`.
#[derive(Default)]
pub struct ScanCache {
    entries: DashMap<(u64, String), Arc<Vec<TypeHandle>>>,
    scan_lock: Mutex<()>,
    skips: SkipLog,
}

impl ScanCache {
    /// Create an empty scan cache.
    #[must_use]
    pub fn new() -> Self {
        ScanCache::default()
    }

    /// All types defined under `prefix`, memoized per `(loader, prefix)`.
    ///
    /// The first call for a given key performs the scan under the coarse scan
    /// lock; concurrent first-time callers for any key serialize there, and
    /// every later call is a lock-free cache hit.
    ///
    /// # Errors
    /// I/O or archive failures from the underlying traversals, and
    /// [`Error::LockError`] if the scan lock was poisoned.
    pub fn find_types(
        &self,
        loader: &dyn CodeLoader,
        prefix: &str,
    ) -> Result<Arc<Vec<TypeHandle>>> {
        let key = (loader.loader_id(), prefix.to_string());
        if let Some(hit) = self.entries.get(&key) {
            return Ok(hit.clone());
        }

        let _guard = self.scan_lock.lock().map_err(|_| Error::LockError)?;
        if let Some(hit) = self.entries.get(&key) {
            return Ok(hit.clone());
        }

        let types = Arc::new(scan_for_types(loader, prefix, &self.skips)?);
        self.entries.insert(key, Arc::clone(&types));
        Ok(types)
    }

    /// Number of names skipped across all scans through this cache.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skips.count()
    }

    /// Snapshot of the skipped fully-qualified names.
    #[must_use]
    pub fn skipped_names(&self) -> Vec<String> {
        self.skips.names()
    }
}

/// Scan all code units the loader resolves for `prefix`, unmemoized.
///
/// Directory and archive traversal compose transparently based on the
/// resource kind; locations are scanned in parallel and results concatenated.
///
/// # Errors
/// I/O failures from directory walks and archive reads. Per-name load
/// failures are not errors; they are recorded in `skips`.
pub fn scan_for_types(
    loader: &dyn CodeLoader,
    prefix: &str,
    skips: &SkipLog,
) -> Result<Vec<TypeHandle>> {
    let prefix_path = prefix.replace('.', "/");
    let locations = loader.resources(&prefix_path)?;

    let nested: Vec<Vec<TypeHandle>> = locations
        .into_par_iter()
        .map(|location| match location {
            ResourceLocation::Directory(root) => {
                directory::scan_directory(&root, prefix, loader, skips)
            }
            ResourceLocation::Archive(path) => archive::scan_archive(&path, prefix, loader, skips),
        })
        .collect::<Result<_>>()?;

    Ok(nested.into_iter().flatten().collect())
}
