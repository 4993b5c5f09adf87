//! Diagnostic and error types for capsule validation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// What went wrong with a manifest line or archive.
///
/// Attached by whichever check raised the diagnostic. Severity and display
/// category are derived from it, never from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The line contains `|` but no delimiter is surrounded by spaces.
    MalformedDelimiter,
    /// The line has fewer than the four required fields.
    InsufficientFields,
    /// The filename has forbidden characters or is a reserved name.
    InvalidFilename,
    /// The type is not a known category label.
    InvalidType,
    /// The date matches none of the accepted formats.
    InvalidDate,
    /// The item was accepted but carries fewer tags than required.
    InsufficientTags,
    /// A manifest item references a file absent from the archive.
    MissingFile,
    /// An archive-wide count requirement is not met.
    RequirementUnmet,
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Display grouping for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Critical,
    Format,
    Date,
    Tag,
    Type,
    Filename,
}

impl ErrorKind {
    /// Display category for this kind.
    #[must_use]
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::MissingFile | Self::RequirementUnmet => ErrorCategory::Critical,
            Self::MalformedDelimiter | Self::InsufficientFields => ErrorCategory::Format,
            Self::InvalidDate => ErrorCategory::Date,
            Self::InsufficientTags => ErrorCategory::Tag,
            Self::InvalidType => ErrorCategory::Type,
            Self::InvalidFilename => ErrorCategory::Filename,
        }
    }

    /// Severity, derived from the display category.
    #[must_use]
    pub fn severity(self) -> Severity {
        self.category().default_severity()
    }
}

impl ErrorCategory {
    /// Severity shared by every kind in this category.
    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::Critical | Self::Date | Self::Type | Self::Filename => Severity::Error,
            Self::Format | Self::Tag => Severity::Warning,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Format => "format",
            Self::Date => "date",
            Self::Tag => "tag",
            Self::Type => "type",
            Self::Filename => "filename",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Manifest field names, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Filename,
    Type,
    Title,
    Description,
    Date,
    Tags,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Type => "type",
            Self::Title => "title",
            Self::Description => "description",
            Self::Date => "date",
            Self::Tags => "tags",
        }
    }
}

/// Annotation pinpointing one field of an offending line.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProblematicPart {
    /// 0-based position of the field on the line
    pub index: usize,
    /// The trimmed field text
    pub part: String,
    pub field: Field,
    pub is_empty: bool,
    /// Whether this field caused the diagnostic
    pub is_problematic: bool,
    /// What the field should look like
    pub expected: String,
}

/// A single diagnostic produced by manifest parsing or archive validation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ValidationError {
    pub kind: ErrorKind,
    /// Line number (1-indexed) in the manifest, or a synthetic index (also
    /// from 1) for archive-wide checks
    pub line_number: usize,
    /// Raw line text, or a synthesized description for archive-wide checks
    pub line: String,
    /// Human-readable error description
    pub error: String,
    /// Description of the correct form
    pub expected_format: String,
    pub problematic_parts: Vec<ProblematicPart>,
}

impl ValidationError {
    #[must_use]
    pub fn new(
        kind: ErrorKind,
        line_number: usize,
        line: impl Into<String>,
        error: impl Into<String>,
        expected_format: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            line_number,
            line: line.into(),
            error: error.into(),
            expected_format: expected_format.into(),
            problematic_parts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parts(mut self, parts: Vec<ProblematicPart>) -> Self {
        self.problematic_parts = parts;
        self
    }

    /// Severity of this diagnostic's kind.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Display category of this diagnostic's kind.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Fields flagged as the cause of this diagnostic.
    pub fn problematic_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.problematic_parts
            .iter()
            .filter(|p| p.is_problematic)
            .map(|p| p.field)
    }

    /// Format the error for human-readable output.
    ///
    /// Line diagnostics: `line {n}: [{category}] {error} [{line}]`
    /// Archive-wide diagnostics: `[{category}] {error}`
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        if self.kind == ErrorKind::RequirementUnmet {
            format!("[{}] {}", self.category(), self.error)
        } else {
            format!(
                "line {}: [{}] {} [{}]",
                self.line_number,
                self.category(),
                self.error,
                self.line
            )
        }
    }
}

/// Fatal failure to obtain or decode the manifest. Stops parsing before any
/// line is examined.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("Manifest is not valid UTF-8 (invalid byte at offset {offset})")]
    InvalidEncoding { offset: usize },

    #[error("Manifest '{name}' not found in archive")]
    NotFound { name: String },

    #[error("Manifest exceeds maximum size of {max} bytes")]
    TooLarge { max: u64 },
}

/// Failure to read an archive container.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
