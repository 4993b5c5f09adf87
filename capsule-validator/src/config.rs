//! Configuration types for capsule validation.
//!
//! Split into the core validation config (thresholds) and the archive-wide
//! requirement policy. Source-specific limits live here too since every
//! source reads the manifest the same way.

use serde::Serialize;

use crate::fields::DEFAULT_MIN_TAGS;

/// Default manifest file name inside a capsule.
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.txt";

/// Archive-wide count requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct ArchiveRequirements {
    /// Minimum number of news items (default: 5).
    pub min_news: usize,
    /// Minimum number of media items (default: 5).
    pub min_media: usize,
    /// Minimum number of personal items (default: 2).
    pub min_personal: usize,
    /// Minimum number of tags every single item must carry (default: 5).
    pub min_tags_per_item: usize,
}

impl Default for ArchiveRequirements {
    fn default() -> Self {
        Self {
            min_news: 5,
            min_media: 5,
            min_personal: 2,
            min_tags_per_item: DEFAULT_MIN_TAGS,
        }
    }
}

/// Core validation config.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ValidationConfig {
    /// Items with fewer tags get an `InsufficientTags` warning (default: 5).
    pub min_tags: usize,
    /// Archive-wide policy, reported as a summary.
    pub requirements: ArchiveRequirements,
    /// Manifest file name looked up in the archive (default: `manifest.txt`).
    /// Matched case-insensitively against entry base names.
    pub manifest_name: String,
    /// Maximum manifest size in bytes (default: 10 MB).
    pub max_manifest_size: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_tags: DEFAULT_MIN_TAGS,
            requirements: ArchiveRequirements::default(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_owned(),
            max_manifest_size: 10_485_760,
        }
    }
}
