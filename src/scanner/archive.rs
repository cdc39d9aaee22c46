//! Archive traversal for namespace scans.
//!
//! Iterates the entries of a bundled archive code unit, selecting
//! non-directory entries with the compiled-type extension whose name contains
//! the prefix's slash-converted form, deriving each fully-qualified name from
//! the entry name, and attempting to load it. The skip policy matches the
//! directory walker: unresolvable names are recorded and the scan continues.

use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use crate::metadata::handle::TypeHandle;
use crate::scanner::loader::CodeLoader;
use crate::scanner::SkipLog;
use crate::Result;

/// Scan an archive code unit for types under `prefix`.
pub(crate) fn scan_archive(
    path: &Path,
    prefix: &str,
    loader: &dyn CodeLoader,
    skips: &SkipLog,
) -> Result<Vec<TypeHandle>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let prefix_path = format!("{}/", prefix.replace('.', "/"));
    let suffix = format!(".{}", loader.unit_extension());

    let mut found = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let entry_name = entry.name();
        if !entry_name.ends_with(&suffix) {
            continue;
        }
        let Some(position) = entry_name.rfind(&prefix_path) else {
            continue;
        };
        let tail = &entry_name[position + prefix_path.len()..entry_name.len() - suffix.len()];
        let name = format!("{}.{}", prefix, tail.replace('/', "."));

        match loader.load_type(&name) {
            Some(handle) => found.push(handle),
            None => skips.record(&name),
        }
    }
    Ok(found)
}
