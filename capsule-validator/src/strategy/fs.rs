//! Extracted-directory source.
//!
//! Indexes a capsule that has already been unpacked on disk. Symlinks are
//! neither followed nor indexed, so every indexed name is a regular file
//! under the root.

use std::fs::File;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ValidationConfig;
use crate::error::{ManifestError, SourceError};
use crate::strategy::{ArchiveIndex, locate_manifest, read_bounded};

/// Directories never treated as capsule content.
pub const SKIP_DIRS: &[&str] = &[".git", "__MACOSX"];

/// Maximum directory traversal depth.
const MAX_DEPTH: usize = 32;

/// Check if a directory entry is a skip directory (for `WalkDir::filter_entry`).
/// Returns `true` if the entry should be **included**.
fn is_not_skip_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.file_type().is_dir()
        && let Some(name) = entry.file_name().to_str()
    {
        return !SKIP_DIRS.contains(&name);
    }
    true
}

/// `/`-separated path of `path` relative to `root`.
fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

/// Index an extracted capsule directory.
///
/// # Errors
///
/// Returns `SourceError` if the root cannot be read, no manifest is found, or
/// the manifest cannot be read within the size limit. Unreadable entries
/// below the root are skipped with a warning.
pub fn open_dir(root: &Path, config: &ValidationConfig) -> Result<ArchiveIndex, SourceError> {
    let canonical_root = root.canonicalize().map_err(|source| SourceError::Io {
        path: root.display().to_string(),
        source,
    })?;

    let mut names: Vec<String> = Vec::new();
    for entry_result in WalkDir::new(&canonical_root)
        .follow_links(false)
        .max_depth(MAX_DEPTH)
        .into_iter()
        .filter_entry(is_not_skip_dir)
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(walk_err) => {
                tracing::warn!(error = %walk_err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match relative_name(&canonical_root, entry.path()) {
            Some(name) => names.push(name),
            None => {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 path");
            }
        }
    }
    names.sort();
    tracing::debug!(
        root = %canonical_root.display(),
        entries = names.len(),
        "directory indexed"
    );

    let manifest_path = locate_manifest(names.iter().map(String::as_str), &config.manifest_name)
        .ok_or_else(|| ManifestError::NotFound {
            name: config.manifest_name.clone(),
        })?
        .to_owned();

    let full_path: PathBuf = canonical_root.join(&manifest_path);
    let file = File::open(&full_path).map_err(|source| SourceError::Io {
        path: full_path.display().to_string(),
        source,
    })?;
    let manifest = read_bounded(file, config.max_manifest_size, &manifest_path)?;

    Ok(ArchiveIndex::new(&manifest_path, manifest, names))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_open_dir_indexes_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("manifest.txt"), "# empty\n").unwrap();
        fs::write(tmp.path().join("a.jpg"), b"jpeg").unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("docs").join("b.pdf"), b"pdf").unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join(".git").join("HEAD"), b"ref").unwrap();

        let index = open_dir(tmp.path(), &ValidationConfig::default()).unwrap();
        assert_eq!(index.names().collect::<Vec<_>>(), ["a.jpg", "docs/b.pdf"]);
        assert_eq!(index.manifest_bytes(), b"# empty\n");
    }

    #[test]
    fn test_open_dir_without_manifest() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"jpeg").unwrap();
        let err = open_dir(tmp.path(), &ValidationConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Manifest(ManifestError::NotFound { .. })
        ));
    }

    #[test]
    fn test_open_dir_missing_root() {
        let tmp = TempDir::new().unwrap();
        let err = open_dir(&tmp.path().join("nope"), &ValidationConfig::default()).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
