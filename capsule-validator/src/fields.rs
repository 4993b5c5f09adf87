//! Field-level validators for manifest entries.
//!
//! All checks are shape checks. Dates in particular are matched against
//! textual grammars only: `2024-13-99` is accepted.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::category::Category;

/// Characters that may not appear anywhere in a filename.
pub const FORBIDDEN_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names reserved on Windows, compared against the filename stem.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Default minimum number of tags per item.
pub const DEFAULT_MIN_TAGS: usize = 5;

/// Accepted date grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    IsoDate,
    /// `YYYY/MM/DD`
    SlashDate,
    /// `DD.MM.YYYY`
    DottedDate,
    /// `YYYY-MM-DD HH:MM:SS`
    IsoDateTime,
    /// `D:YYYYMMDDHHMMSS`, the PDF metadata timestamp form
    PdfTimestamp,
}

static DATE_PATTERNS: LazyLock<[(DateFormat, Regex); 5]> = LazyLock::new(|| {
    let compile = |pattern: &str| match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid date regex {pattern}: {err}"),
    };
    [
        (DateFormat::IsoDate, compile(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$")),
        (DateFormat::SlashDate, compile(r"^[0-9]{4}/[0-9]{2}/[0-9]{2}$")),
        (DateFormat::DottedDate, compile(r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}$")),
        (
            DateFormat::IsoDateTime,
            compile(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$"),
        ),
        (DateFormat::PdfTimestamp, compile(r"^D:[0-9]{14}$")),
    ]
});

impl DateFormat {
    /// Every accepted format, in detection order.
    pub const ALL: [Self; 5] = [
        Self::IsoDate,
        Self::SlashDate,
        Self::DottedDate,
        Self::IsoDateTime,
        Self::PdfTimestamp,
    ];

    /// Detect which grammar `value` matches, if any.
    #[must_use]
    pub fn detect(value: &str) -> Option<Self> {
        DATE_PATTERNS
            .iter()
            .find(|(_, regex)| regex.is_match(value))
            .map(|(format, _)| *format)
    }

    /// Human-readable template for this grammar.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Self::IsoDate => "YYYY-MM-DD",
            Self::SlashDate => "YYYY/MM/DD",
            Self::DottedDate => "DD.MM.YYYY",
            Self::IsoDateTime => "YYYY-MM-DD HH:MM:SS",
            Self::PdfTimestamp => "D:YYYYMMDDHHMMSS",
        }
    }

    /// All templates joined for use in `expected_format`.
    #[must_use]
    pub fn all_templates() -> String {
        Self::ALL
            .iter()
            .map(|f| f.template())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Check that `name` is safe to use as an archive entry name.
///
/// Rejects empty names, path traversal, forbidden characters and reserved
/// device names (`CON`, `COM1`, `lpt3.txt`, ...).
#[must_use]
pub fn is_valid_filename(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    if name.contains("../") || name.contains("..\\") {
        return false;
    }
    if name.contains(FORBIDDEN_FILENAME_CHARS) {
        return false;
    }
    let stem = name.split('.').next().unwrap_or(name);
    !RESERVED_NAMES
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
}

/// Check that `label` belongs to the category vocabulary.
#[must_use]
pub fn is_valid_type(label: &str) -> bool {
    Category::parse(label).is_known()
}

/// Check that `value` matches one of the accepted date grammars.
#[must_use]
pub fn is_valid_date(value: &str) -> bool {
    DateFormat::detect(value).is_some()
}

/// Split a raw tag field on commas, trimming pieces and dropping empty ones.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Check a single tag, e.g. one supplied by document metadata.
#[must_use]
pub fn is_valid_tag(tag: &str) -> bool {
    let trimmed = tag.trim();
    !trimmed.is_empty() && !trimmed.contains(',')
}

/// `true` when `tags` has at least `min` entries.
#[must_use]
pub fn has_minimum_tags(tags: &[String], min: usize) -> bool {
    tags.len() >= min
}

#[cfg(test)]
#[allow(clippy::non_ascii_literal)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_accepts_plain_names() {
        assert!(is_valid_filename("a.jpg"));
        assert!(is_valid_filename("holiday photo 2024.png"));
        assert!(is_valid_filename("console.log"));
        assert!(is_valid_filename("CONTRACT.pdf"));
    }

    #[test]
    fn test_filename_rejects_traversal() {
        assert!(!is_valid_filename("../secret.txt"));
        assert!(!is_valid_filename("..\\secret.txt"));
    }

    #[test]
    fn test_filename_rejects_forbidden_chars() {
        for bad in ["a<b", "a>b", "a:b", "a\"b", "dir/a", "a\\b", "a|b", "a?b", "a*b"] {
            assert!(!is_valid_filename(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_filename_rejects_reserved_names() {
        assert!(!is_valid_filename("CON"));
        assert!(!is_valid_filename("con.txt"));
        assert!(!is_valid_filename("Com1.jpg"));
        assert!(!is_valid_filename("LPT9"));
        assert!(is_valid_filename("COM10.txt"));
    }

    #[test]
    fn test_filename_rejects_empty() {
        assert!(!is_valid_filename(""));
        assert!(!is_valid_filename("   "));
    }

    #[test]
    fn test_date_grammars() {
        assert_eq!(DateFormat::detect("2024-01-01"), Some(DateFormat::IsoDate));
        assert_eq!(DateFormat::detect("2024/01/01"), Some(DateFormat::SlashDate));
        assert_eq!(DateFormat::detect("01.01.2024"), Some(DateFormat::DottedDate));
        assert_eq!(
            DateFormat::detect("2024-01-01 12:30:00"),
            Some(DateFormat::IsoDateTime)
        );
        assert_eq!(
            DateFormat::detect("D:20240101123000"),
            Some(DateFormat::PdfTimestamp)
        );
    }

    #[test]
    fn test_date_rejects_other_shapes() {
        assert!(!is_valid_date("2024-1-1"));
        assert!(!is_valid_date("01/01/2024"));
        assert!(!is_valid_date("yesterday"));
        assert!(!is_valid_date("D:2024010112300"));
        assert!(!is_valid_date("D:20240101123000+03'00'"));
        assert!(!is_valid_date(""));
    }

    #[test]
    fn test_date_out_of_range_values_are_accepted() {
        // Only the shape is checked, not the calendar.
        assert!(is_valid_date("2024-13-99"));
        assert!(is_valid_date("99.99.0000"));
    }

    #[test]
    fn test_all_templates_lists_every_grammar() {
        let templates = DateFormat::all_templates();
        for format in DateFormat::ALL {
            assert!(templates.contains(format.template()));
        }
    }

    #[test]
    fn test_parse_tags_trims_and_drops_empty() {
        assert_eq!(parse_tags(" a, b ,,c , "), vec!["a", "b", "c"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn test_parse_tags_keeps_duplicates_in_order() {
        assert_eq!(parse_tags("x,y,x"), vec!["x", "y", "x"]);
    }

    #[test]
    fn test_is_valid_tag() {
        assert!(is_valid_tag("summer"));
        assert!(is_valid_tag("  summer "));
        assert!(!is_valid_tag("   "));
        assert!(!is_valid_tag("a,b"));
    }

    #[test]
    fn test_has_minimum_tags() {
        let tags = parse_tags("a,b,c,d,e");
        assert!(has_minimum_tags(&tags, DEFAULT_MIN_TAGS));
        assert!(!has_minimum_tags(&tags[..4], DEFAULT_MIN_TAGS));
        assert!(has_minimum_tags(&[], 0));
    }

    #[test]
    fn test_is_valid_type() {
        assert!(is_valid_type("МЕДИА"));
        assert!(!is_valid_type("MEDIA"));
    }
}
