//! Archive sources.
//!
//! Each source turns a container (ZIP file or extracted directory) into an
//! [`ArchiveIndex`]: the manifest bytes plus the set of entry names, rebased
//! so that names are relative to the manifest's directory. The core
//! validation engine only ever sees the index.

pub mod fs;
pub mod zip;

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use crate::error::{ManifestError, SourceError};

/// Kind of container a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Zip,
    Directory,
}

/// Name-keyed view of an archive's contents.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    entries: BTreeSet<String>,
    lowercase: BTreeMap<String, String>,
    manifest: Vec<u8>,
    manifest_path: String,
}

impl ArchiveIndex {
    /// Build an index from raw entry paths (`/`-separated) and the manifest
    /// located among them.
    ///
    /// Entries outside the manifest's directory are dropped; the manifest
    /// itself is not an entry.
    #[must_use]
    pub fn new<I>(manifest_path: &str, manifest: Vec<u8>, entries: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let prefix = match manifest_path.rfind('/') {
            Some(pos) => &manifest_path[..=pos],
            None => "",
        };

        let mut index = Self {
            manifest,
            manifest_path: manifest_path.to_owned(),
            ..Self::default()
        };
        for entry in entries {
            if entry == manifest_path || entry.ends_with('/') {
                continue;
            }
            let Some(relative) = entry.strip_prefix(prefix) else {
                continue;
            };
            index
                .lowercase
                .entry(relative.to_lowercase())
                .or_insert_with(|| relative.to_owned());
            index.entries.insert(relative.to_owned());
        }
        index
    }

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Case-insensitive lookup returning the stored name.
    #[must_use]
    pub fn find_ignore_case(&self, name: &str) -> Option<&str> {
        if let Some(exact) = self.entries.get(name) {
            return Some(exact.as_str());
        }
        self.lowercase
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn manifest_bytes(&self) -> &[u8] {
        &self.manifest
    }

    /// Path of the manifest inside the container.
    #[must_use]
    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }
}

/// Pick the manifest among `paths`: base name equal to `name` ignoring case,
/// shallowest first, then lexicographically first.
#[must_use]
pub fn locate_manifest<'a, I>(paths: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .filter(|path| {
            let base = path.rsplit('/').next().unwrap_or_default();
            base.eq_ignore_ascii_case(name)
        })
        .min_by(|a, b| {
            let depth = |p: &str| p.matches('/').count();
            depth(a).cmp(&depth(b)).then_with(|| a.cmp(b))
        })
}

/// Read at most `max` bytes of the manifest at `path`.
///
/// Reads `max + 1` bytes so an oversized manifest is detected without
/// buffering it whole.
///
/// # Errors
///
/// Returns `SourceError::Io` on read failure and `ManifestError::TooLarge`
/// when the reader holds more than `max` bytes.
pub fn read_bounded<R: Read>(reader: R, max: u64, path: &str) -> Result<Vec<u8>, SourceError> {
    let mut buffer = Vec::new();
    reader
        .take(max.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(|source| SourceError::Io {
            path: path.to_owned(),
            source,
        })?;
    if buffer.len() as u64 > max {
        return Err(ManifestError::TooLarge { max }.into());
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(manifest: &str, entries: &[&str]) -> ArchiveIndex {
        ArchiveIndex::new(
            manifest,
            Vec::new(),
            entries.iter().map(|e| (*e).to_owned()),
        )
    }

    #[test]
    fn test_index_rebases_to_manifest_dir() {
        let idx = index(
            "capsule/manifest.txt",
            &[
                "capsule/manifest.txt",
                "capsule/a.jpg",
                "capsule/docs/b.pdf",
                "capsule/",
                "__MACOSX/capsule/._a.jpg",
            ],
        );
        assert_eq!(idx.names().collect::<Vec<_>>(), ["a.jpg", "docs/b.pdf"]);
        assert!(idx.contains("a.jpg"));
        assert!(!idx.contains("capsule/a.jpg"));
        assert!(!idx.contains("manifest.txt"));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let idx = index("manifest.txt", &["Photo.JPG", "notes.txt"]);
        assert!(!idx.contains("photo.jpg"));
        assert_eq!(idx.find_ignore_case("photo.jpg"), Some("Photo.JPG"));
        assert_eq!(idx.find_ignore_case("notes.txt"), Some("notes.txt"));
        assert_eq!(idx.find_ignore_case("missing.txt"), None);
    }

    #[test]
    fn test_locate_manifest_prefers_shallowest() {
        let paths = [
            "a/b/manifest.txt",
            "x/MANIFEST.TXT",
            "z/manifest.txt",
            "manifest.txt.bak",
        ];
        assert_eq!(
            locate_manifest(paths.iter().copied(), "manifest.txt"),
            Some("x/MANIFEST.TXT")
        );
    }

    #[test]
    fn test_locate_manifest_absent() {
        assert_eq!(locate_manifest(["a.jpg"].iter().copied(), "manifest.txt"), None);
    }

    #[test]
    fn test_read_bounded() {
        assert_eq!(read_bounded(&b"abc"[..], 3, "m").unwrap(), b"abc");
        assert!(matches!(
            read_bounded(&b"abcd"[..], 3, "m"),
            Err(SourceError::Manifest(ManifestError::TooLarge { max: 3 }))
        ));
    }
}
