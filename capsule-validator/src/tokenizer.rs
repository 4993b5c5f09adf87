//! Manifest line tokenizer.
//!
//! Splits manifest text into logical lines, skipping blanks and `#` comments,
//! and splits each line on the `|` delimiter.
//!
//! A line containing `|` is rejected unless at least one delimiter has
//! whitespace on both sides. This catches fields with embedded, unspaced `|`
//! at the cost of also rejecting tidy unspaced lines such as `a|b|c|d`.

use std::sync::LazyLock;

use regex::Regex;

/// Field delimiter.
pub const DELIMITER: char = '|';

/// Fewest fields a line may have: filename, type, title, date.
pub const MIN_FIELDS: usize = 4;

/// Most fields a line may have: filename, type, title, description, date, tags.
pub const MAX_FIELDS: usize = 6;

static SPACED_DELIMITER: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"\s\|\s") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid delimiter regex: {err}"),
});

/// A non-blank, non-comment manifest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestLine<'a> {
    /// 1-indexed position in the manifest text
    pub line_number: usize,
    /// The line as written, without the line terminator
    pub raw: &'a str,
}

/// Lazy iterator over the meaningful lines of a manifest.
#[derive(Debug, Clone)]
pub struct ManifestLines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Iterator for ManifestLines<'a> {
    type Item = ManifestLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|(idx, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(ManifestLine {
                    line_number: idx + 1,
                    raw,
                })
            }
        })
    }
}

/// Iterate over the lines of `text` that carry manifest entries.
#[must_use]
pub fn manifest_lines(text: &str) -> ManifestLines<'_> {
    ManifestLines {
        inner: text.lines().enumerate(),
    }
}

/// Why a line could not be split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeError {
    /// `|` is present but never surrounded by whitespace.
    MalformedDelimiter,
    /// Fewer than [`MIN_FIELDS`] fields.
    InsufficientFields { found: usize },
}

/// Whether the line satisfies the delimiter spacing rule.
#[must_use]
pub fn has_spaced_delimiter(raw: &str) -> bool {
    SPACED_DELIMITER.is_match(raw)
}

/// Split a manifest line into trimmed fields.
///
/// Fields past [`MAX_FIELDS`] are returned as-is; callers decide what to do
/// with them.
///
/// # Errors
///
/// Returns [`TokenizeError::MalformedDelimiter`] if the line contains `|` but
/// breaks the spacing rule, or [`TokenizeError::InsufficientFields`] if fewer
/// than [`MIN_FIELDS`] fields are present.
pub fn split_fields(raw: &str) -> Result<Vec<&str>, TokenizeError> {
    if raw.contains(DELIMITER) && !has_spaced_delimiter(raw) {
        return Err(TokenizeError::MalformedDelimiter);
    }

    let fields: Vec<&str> = raw.split(DELIMITER).map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return Err(TokenizeError::InsufficientFields {
            found: fields.len(),
        });
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_skip_blanks_and_comments() {
        let text = "# header\n\na | b | c | d\n   \n  # indented comment\ne | f | g | h\n";
        let lines: Vec<_> = manifest_lines(text).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 3);
        assert_eq!(lines[0].raw, "a | b | c | d");
        assert_eq!(lines[1].line_number, 6);
    }

    #[test]
    fn test_lines_handle_crlf() {
        let text = "a | b | c | d\r\n# c\r\ne | f | g | h\r\n";
        let lines: Vec<_> = manifest_lines(text).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].line_number, 3);
        assert_eq!(lines[1].raw, "e | f | g | h");
    }

    #[test]
    fn test_lines_empty_text() {
        assert_eq!(manifest_lines("").count(), 0);
    }

    #[test]
    fn test_split_trims_fields() {
        let fields = split_fields("a.jpg |  T | title | 2024-01-01 ").unwrap();
        assert_eq!(fields, ["a.jpg", "T", "title", "2024-01-01"]);
    }

    #[test]
    fn test_split_rejects_unspaced_delimiters() {
        assert_eq!(
            split_fields("a|b|c|d"),
            Err(TokenizeError::MalformedDelimiter)
        );
    }

    #[test]
    fn test_single_spaced_delimiter_is_enough() {
        let fields = split_fields("a|b | c|d").unwrap();
        assert_eq!(fields, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_tab_counts_as_spacing() {
        assert!(has_spaced_delimiter("a\t|\tb"));
        assert!(!has_spaced_delimiter("a |b"));
    }

    #[test]
    fn test_split_rejects_too_few_fields() {
        assert_eq!(
            split_fields("a.jpg | T | title"),
            Err(TokenizeError::InsufficientFields { found: 3 })
        );
        assert_eq!(
            split_fields("just some text"),
            Err(TokenizeError::InsufficientFields { found: 1 })
        );
    }

    #[test]
    fn test_split_keeps_empty_fields() {
        let fields = split_fields("a | T | | 2024-01-01").unwrap();
        assert_eq!(fields, ["a", "T", "", "2024-01-01"]);
    }
}
