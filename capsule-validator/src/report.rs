//! Validation report types.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ErrorCategory, Severity, ValidationError};
use crate::model::ArchiveItem;
use crate::structural::RequirementsSummary;

/// Result of validating a capsule.
///
/// Rendering is never blocked by diagnostics: `items` holds every item that
/// passed field validation, and `errors` the diagnostics to show inline.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct CapsuleReport {
    /// Path of the manifest inside the container, when read from one.
    pub manifest_path: Option<String>,
    /// Number of files in the archive besides the manifest.
    pub archive_files: usize,
    pub items: Vec<ArchiveItem>,
    /// Line diagnostics and missing-file diagnostics, ordered by line.
    pub errors: Vec<ValidationError>,
    /// Archive-wide requirement summary.
    pub requirements: RequirementsSummary,
    /// No error-severity diagnostic and all requirements met.
    pub ok: bool,
}

impl CapsuleReport {
    /// Assemble a report, ordering diagnostics by line and deriving `ok`.
    #[must_use]
    pub fn new(
        items: Vec<ArchiveItem>,
        mut errors: Vec<ValidationError>,
        requirements: RequirementsSummary,
    ) -> Self {
        errors.sort_by_key(|e| e.line_number);
        let ok = requirements.is_valid && !errors.iter().any(|e| e.severity() == Severity::Error);
        Self {
            manifest_path: None,
            archive_files: 0,
            items,
            errors,
            requirements,
            ok,
        }
    }

    /// Number of error-severity diagnostics.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.count_severity(Severity::Error)
    }

    /// Number of warning-severity diagnostics.
    #[must_use]
    pub fn warnings_count(&self) -> usize {
        self.count_severity(Severity::Warning)
    }

    fn count_severity(&self, severity: Severity) -> usize {
        self.errors
            .iter()
            .filter(|e| e.severity() == severity)
            .count()
    }

    /// Diagnostic counts per display category.
    #[must_use]
    pub fn errors_by_category(&self) -> BTreeMap<ErrorCategory, usize> {
        let mut counts = BTreeMap::new();
        for error in &self.errors {
            *counts.entry(error.category()).or_default() += 1;
        }
        counts
    }

    /// Diagnostics whose display category is `category`.
    pub fn errors_in(&self, category: ErrorCategory) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.category() == category)
    }
}
