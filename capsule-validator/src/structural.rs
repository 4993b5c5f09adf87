//! Structural validation: manifest items against archive contents and
//! archive-wide policy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::Category;
use crate::config::ArchiveRequirements;
use crate::error::{ErrorKind, Field, ProblematicPart, ValidationError};
use crate::fields::has_minimum_tags;
use crate::model::ArchiveItem;

/// Check that every item's file exists in the archive.
///
/// `exists` is an exact, case-sensitive name lookup. One `MissingFile`
/// diagnostic is produced per item whose file is absent, at the item's
/// manifest line.
#[must_use]
pub fn validate_files<F>(items: &[ArchiveItem], exists: F) -> Vec<ValidationError>
where
    F: Fn(&str) -> bool,
{
    let _span = tracing::debug_span!("validate_files", items = items.len()).entered();

    let errors: Vec<ValidationError> = items
        .iter()
        .filter(|item| !exists(&item.filename))
        .map(missing_file_error)
        .collect();

    if !errors.is_empty() {
        tracing::warn!(missing = errors.len(), "manifest references missing files");
    }
    errors
}

fn missing_file_error(item: &ArchiveItem) -> ValidationError {
    ValidationError::new(
        ErrorKind::MissingFile,
        item.line_number,
        item.filename.clone(),
        format!("File '{}' not found in archive", item.filename),
        "a file with this exact name next to the manifest",
    )
    .with_parts(vec![ProblematicPart {
        index: 0,
        part: item.filename.clone(),
        field: Field::Filename,
        is_empty: false,
        is_problematic: true,
        expected: "existing archive entry".to_owned(),
    }])
}

/// Outcome of the archive-wide requirement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct RequirementsSummary {
    pub is_valid: bool,
    pub news_count: usize,
    pub media_count: usize,
    pub personal_count: usize,
    pub total_items: usize,
    /// Items carrying fewer than `min_tags_per_item` tags
    pub items_below_tag_minimum: usize,
    /// Item count for every category present
    pub counts: BTreeMap<Category, usize>,
    /// Thresholds the counts were checked against
    pub requirements: ArchiveRequirements,
}

impl RequirementsSummary {
    #[must_use]
    pub fn all_items_tagged(&self) -> bool {
        self.items_below_tag_minimum == 0
    }

    /// Unmet requirements as archive-level diagnostics.
    ///
    /// Each requirement has a fixed synthetic line number, starting at 1:
    /// news, media, personal, then tags per item.
    #[must_use]
    pub fn to_errors(&self) -> Vec<ValidationError> {
        let req = &self.requirements;
        let mut errors = Vec::new();
        let mut check = |index: usize, label: &str, count: usize, min: usize| {
            if count < min {
                errors.push(ValidationError::new(
                    ErrorKind::RequirementUnmet,
                    index,
                    format!("{label} items: {count}"),
                    format!("At least {min} {label} items required, found {count}"),
                    format!("{label} items >= {min}"),
                ));
            }
        };
        check(1, "news", self.news_count, req.min_news);
        check(2, "media", self.media_count, req.min_media);
        check(3, "personal", self.personal_count, req.min_personal);

        if !self.all_items_tagged() {
            errors.push(ValidationError::new(
                ErrorKind::RequirementUnmet,
                4,
                format!(
                    "items below tag minimum: {} of {}",
                    self.items_below_tag_minimum, self.total_items
                ),
                format!(
                    "Every item requires at least {} tags; {} do not",
                    req.min_tags_per_item, self.items_below_tag_minimum
                ),
                format!("tags per item >= {}", req.min_tags_per_item),
            ));
        }
        errors
    }
}

/// Count items per category and check them against `requirements`.
///
/// Informational: the summary does not block rendering.
#[must_use]
pub fn validate_archive_requirements(
    items: &[ArchiveItem],
    requirements: &ArchiveRequirements,
) -> RequirementsSummary {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item.category).or_default() += 1;
    }
    let count = |category: Category| counts.get(&category).copied().unwrap_or(0);
    let news_count = count(Category::News);
    let media_count = count(Category::Media);
    let personal_count = count(Category::Personal);

    let items_below_tag_minimum = items
        .iter()
        .filter(|item| !has_minimum_tags(&item.tags, requirements.min_tags_per_item))
        .count();

    let is_valid = news_count >= requirements.min_news
        && media_count >= requirements.min_media
        && personal_count >= requirements.min_personal
        && items_below_tag_minimum == 0;

    tracing::debug!(
        news = news_count,
        media = media_count,
        personal = personal_count,
        untagged = items_below_tag_minimum,
        is_valid,
        "archive requirements checked"
    );

    RequirementsSummary {
        is_valid,
        news_count,
        media_count,
        personal_count,
        total_items: items.len(),
        items_below_tag_minimum,
        counts,
        requirements: requirements.clone(),
    }
}
