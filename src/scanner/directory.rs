//! Directory traversal for namespace scans.
//!
//! Recursively walks a directory code unit rooted at the resolved location of
//! a namespace prefix, selecting regular files whose extension marks them as
//! compiled-type units, deriving each fully-qualified name from its path
//! relative to the root, and attempting to load it. Names that fail to
//! resolve are skipped and recorded, never propagated: a namespace may
//! legitimately contain non-type resources.

use std::path::Path;

use crate::metadata::handle::TypeHandle;
use crate::scanner::loader::CodeLoader;
use crate::scanner::SkipLog;
use crate::Result;

/// Scan a directory code unit for types under `prefix`.
///
/// `root` is the directory corresponding to the prefix itself, as resolved by
/// the loader.
pub(crate) fn scan_directory(
    root: &Path,
    prefix: &str,
    loader: &dyn CodeLoader,
    skips: &SkipLog,
) -> Result<Vec<TypeHandle>> {
    let mut found = Vec::new();
    walk(root, root, prefix, loader, skips, &mut found)?;
    Ok(found)
}

fn walk(
    root: &Path,
    dir: &Path,
    prefix: &str,
    loader: &dyn CodeLoader,
    skips: &SkipLog,
    found: &mut Vec<TypeHandle>,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk(root, &path, prefix, loader, skips, found)?;
        } else if file_type.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(loader.unit_extension())
        {
            let Some(name) = qualified_name(root, &path, prefix) else {
                continue;
            };
            match loader.load_type(&name) {
                Some(handle) => found.push(handle),
                None => skips.record(&name),
            }
        }
    }
    Ok(())
}

/// Derive the fully-qualified name of a unit file from its path under the
/// prefix root: strip the extension, convert separators to dots, prepend the
/// prefix.
fn qualified_name(root: &Path, path: &Path, prefix: &str) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let mut name = String::from(prefix);
    for component in relative.components() {
        name.push('.');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    Some(name)
}
