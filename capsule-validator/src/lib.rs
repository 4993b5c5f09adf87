//! # capsule-validator
//!
//! Manifest parser and structural validator for digital time capsules.
//!
//! A capsule is a ZIP archive (or an extracted directory) holding a plain-text
//! manifest plus the media and document files it lists. This crate separates
//! the **core validation engine**, which works on manifest text and a
//! file-existence lookup, from the **archive sources** that produce them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use capsule_validator::{ValidationConfig, validate_path};
//!
//! let report = validate_path(Path::new("capsule.zip"), &ValidationConfig::default()).unwrap();
//! println!("Items: {}", report.items.len());
//! println!("Errors: {}", report.errors_count());
//! println!("Requirements met: {}", report.requirements.is_valid);
//! ```
//!
//! The engine can also be driven directly:
//!
//! ```rust
//! use capsule_validator::{ValidationConfig, validate_manifest};
//!
//! let text = "a.jpg | ФОТО | Beach | Sunset | 2024-07-01 | sea,sun,sand,summer,family";
//! let report = validate_manifest(text, |name| name == "a.jpg", &ValidationConfig::default());
//! assert_eq!(report.items.len(), 1);
//! assert!(report.errors.is_empty());
//! ```

mod category;
mod config;
mod error;
pub mod fields;
mod model;
pub mod output;
mod parser;
mod report;
pub mod strategy;
mod structural;
pub mod tokenizer;

use std::path::Path;

pub use category::Category;
pub use config::{ArchiveRequirements, DEFAULT_MANIFEST_NAME, ValidationConfig};
pub use error::{
    ErrorCategory, ErrorKind, Field, ManifestError, ProblematicPart, Severity, SourceError,
    ValidationError,
};
pub use model::ArchiveItem;
pub use parser::{
    LINE_FORMAT, LineOutcome, ParsedManifest, parse_line, parse_manifest, parse_manifest_bytes,
    parse_manifest_with_min_tags,
};
pub use report::CapsuleReport;
pub use strategy::{ArchiveIndex, SourceKind};
pub use structural::{RequirementsSummary, validate_archive_requirements, validate_files};

/// Validate manifest text against a file-existence lookup.
///
/// Runs the parser, the missing-file check and the archive-wide requirement
/// check. Never fails: every problem is a diagnostic in the report.
#[must_use]
pub fn validate_manifest<F>(text: &str, exists: F, config: &ValidationConfig) -> CapsuleReport
where
    F: Fn(&str) -> bool,
{
    let parsed = parse_manifest_with_min_tags(text, config.min_tags);
    assemble(parsed, exists, config)
}

/// Validate an indexed archive.
///
/// # Errors
///
/// Returns [`ManifestError::InvalidEncoding`] if the manifest is not UTF-8.
pub fn validate_index(
    index: &ArchiveIndex,
    config: &ValidationConfig,
) -> Result<CapsuleReport, ManifestError> {
    let parsed = parse_manifest_bytes(index.manifest_bytes(), config.min_tags)?;
    let mut report = assemble(parsed, |name| index.contains(name), config);
    report.manifest_path = Some(index.manifest_path().to_owned());
    report.archive_files = index.len();
    Ok(report)
}

fn assemble<F>(parsed: ParsedManifest, exists: F, config: &ValidationConfig) -> CapsuleReport
where
    F: Fn(&str) -> bool,
{
    let ParsedManifest { items, mut errors } = parsed;
    errors.extend(validate_files(&items, exists));
    let requirements = validate_archive_requirements(&items, &config.requirements);
    CapsuleReport::new(items, errors, requirements)
}

/// Determine the container kind of `path`.
#[must_use]
pub fn source_kind(path: &Path) -> Option<SourceKind> {
    if path.is_dir() {
        return Some(SourceKind::Directory);
    }
    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
    (path.is_file() && is_zip).then_some(SourceKind::Zip)
}

/// Open a ZIP file or extracted directory as an [`ArchiveIndex`].
///
/// # Errors
///
/// Returns an error if `path` does not exist, is neither a directory nor a
/// `.zip` file, or the source cannot be read.
pub fn open_source(path: &Path, config: &ValidationConfig) -> anyhow::Result<ArchiveIndex> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    let _span = tracing::info_span!("open_source", path = %path.display()).entered();
    let index = match source_kind(path) {
        Some(SourceKind::Zip) => strategy::zip::open_zip(path, config)?,
        Some(SourceKind::Directory) => strategy::fs::open_dir(path, config)?,
        None => anyhow::bail!(
            "Unsupported capsule source (expected a .zip file or a directory): {}",
            path.display()
        ),
    };
    tracing::info!(
        manifest = index.manifest_path(),
        files = index.len(),
        "capsule opened"
    );
    Ok(index)
}

/// Validate a capsule on disk.
///
/// This is the primary public API.
///
/// # Errors
///
/// Returns an error if the source cannot be opened (see [`open_source`]) or
/// the manifest is not UTF-8. Manifest and archive problems are reported in
/// the returned report, never as `Err`.
pub fn validate_path(path: &Path, config: &ValidationConfig) -> anyhow::Result<CapsuleReport> {
    let index = open_source(path, config)?;
    Ok(validate_index(&index, config)?)
}
