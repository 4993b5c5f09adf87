//! ZIP container source.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use ::zip::ZipArchive;

use crate::config::ValidationConfig;
use crate::error::{ManifestError, SourceError};
use crate::strategy::{ArchiveIndex, locate_manifest, read_bounded};

/// Open a ZIP file on disk and index it.
///
/// # Errors
///
/// Returns `SourceError` if the file cannot be opened, is not a ZIP archive,
/// has no manifest, or the manifest is too large.
pub fn open_zip(path: &Path, config: &ValidationConfig) -> Result<ArchiveIndex, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    index_zip(file, config)
}

/// Index a ZIP archive from any seekable reader.
///
/// # Errors
///
/// See [`open_zip`].
pub fn index_zip<R: Read + Seek>(
    reader: R,
    config: &ValidationConfig,
) -> Result<ArchiveIndex, SourceError> {
    let mut archive = ZipArchive::new(reader)?;
    let names: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(str::to_owned)
        .collect();
    tracing::debug!(entries = names.len(), "zip archive opened");

    let manifest_path = locate_manifest(names.iter().map(String::as_str), &config.manifest_name)
        .ok_or_else(|| ManifestError::NotFound {
            name: config.manifest_name.clone(),
        })?
        .to_owned();

    let manifest = {
        let entry = archive.by_name(&manifest_path)?;
        read_bounded(entry, config.max_manifest_size, &manifest_path)?
    };
    tracing::debug!(manifest = %manifest_path, bytes = manifest.len(), "manifest read");

    Ok(ArchiveIndex::new(&manifest_path, manifest, names))
}
