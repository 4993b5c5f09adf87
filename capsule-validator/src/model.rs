//! Parsed manifest records.

use serde::Serialize;

use crate::category::Category;

/// One manifest entry that passed field-level validation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ArchiveItem {
    pub filename: String,
    /// The `type` field exactly as written (trimmed)
    #[serde(rename = "type")]
    pub item_type: String,
    /// Parsed form of `item_type`; never `Category::Unknown`
    pub category: Category,
    pub title: String,
    pub description: String,
    pub date: String,
    /// Tags in manifest order, duplicates kept
    pub tags: Vec<String>,
    /// Manifest line the item was parsed from (1-indexed)
    pub line_number: usize,
}

impl ArchiveItem {
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Title to display, falling back to the filename when the manifest
    /// title is blank.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.filename
        } else {
            &self.title
        }
    }
}
