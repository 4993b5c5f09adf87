//! Manifest parser.
//!
//! Drives the tokenizer and field validators over every manifest line and
//! produces typed items plus one diagnostic per rejected line. Parsing never
//! fails on malformed lines; only undecodable input is an `Err`.
//!
//! Checks on a line stop at the first invalid field (filename, then type,
//! then date). The one exception is a short tag list: the item is kept and an
//! `InsufficientTags` warning is reported alongside it.

use serde::Serialize;

use crate::category::Category;
use crate::error::{ErrorKind, Field, ManifestError, ProblematicPart, ValidationError};
use crate::fields::{
    DEFAULT_MIN_TAGS, DateFormat, has_minimum_tags, is_valid_date, is_valid_filename, parse_tags,
};
use crate::model::ArchiveItem;
use crate::tokenizer::{
    DELIMITER, MAX_FIELDS, MIN_FIELDS, ManifestLine, TokenizeError, manifest_lines, split_fields,
};

/// The manifest line layout, shown in diagnostics.
pub const LINE_FORMAT: &str = "filename | type | title | description | date | tag1,tag2,...";

/// Result of parsing a whole manifest.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ParsedManifest {
    /// Items from lines that passed field validation, in manifest order
    pub items: Vec<ArchiveItem>,
    /// Line diagnostics, in manifest order
    pub errors: Vec<ValidationError>,
}

impl ParsedManifest {
    /// `true` when no line produced a diagnostic.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of parsing a single manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Every field passed.
    Accepted(ArchiveItem),
    /// Accepted, but with a non-fatal diagnostic (short tag list).
    AcceptedWithWarning(ArchiveItem, ValidationError),
    /// The line produced no item.
    Rejected(ValidationError),
}

/// Parse manifest text using the default tag minimum.
#[must_use]
pub fn parse_manifest(text: &str) -> ParsedManifest {
    parse_manifest_with_min_tags(text, DEFAULT_MIN_TAGS)
}

/// Parse manifest text, warning about items with fewer than `min_tags` tags.
#[must_use]
pub fn parse_manifest_with_min_tags(text: &str, min_tags: usize) -> ParsedManifest {
    let _span = tracing::debug_span!("parse_manifest", bytes = text.len()).entered();

    let mut parsed = ParsedManifest::default();
    for line in manifest_lines(text) {
        match parse_line(line, min_tags) {
            LineOutcome::Accepted(item) => parsed.items.push(item),
            LineOutcome::AcceptedWithWarning(item, warning) => {
                tracing::debug!(
                    line = line.line_number,
                    kind = ?warning.kind,
                    "item accepted with warning"
                );
                parsed.items.push(item);
                parsed.errors.push(warning);
            }
            LineOutcome::Rejected(error) => {
                tracing::debug!(
                    line = line.line_number,
                    kind = ?error.kind,
                    "manifest line rejected"
                );
                parsed.errors.push(error);
            }
        }
    }

    tracing::info!(
        items = parsed.items.len(),
        errors = parsed.errors.len(),
        "manifest parsed"
    );
    parsed
}

/// Decode manifest bytes as UTF-8 and parse them.
///
/// A leading byte-order mark is ignored.
///
/// # Errors
///
/// Returns [`ManifestError::InvalidEncoding`] if `bytes` is not valid UTF-8.
/// No line is parsed in that case.
pub fn parse_manifest_bytes(
    bytes: &[u8],
    min_tags: usize,
) -> Result<ParsedManifest, ManifestError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ManifestError::InvalidEncoding {
        offset: e.valid_up_to(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(parse_manifest_with_min_tags(text, min_tags))
}

/// Parse one tokenized manifest line.
#[must_use]
pub fn parse_line(line: ManifestLine<'_>, min_tags: usize) -> LineOutcome {
    let fields = match split_fields(line.raw) {
        Ok(fields) => fields,
        Err(err) => return LineOutcome::Rejected(tokenize_error(line, err)),
    };

    if fields.len() > MAX_FIELDS {
        tracing::debug!(
            line = line.line_number,
            fields = fields.len(),
            "ignoring fields after the sixth"
        );
    }

    let layout = field_layout(fields.len());
    let value = |field: Field| {
        layout
            .iter()
            .position(|f| *f == field)
            .and_then(|idx| fields.get(idx).copied())
            .unwrap_or("")
    };

    let filename = value(Field::Filename);
    if !is_valid_filename(filename) {
        return LineOutcome::Rejected(field_error(
            line,
            &fields,
            layout,
            Field::Filename,
            ErrorKind::InvalidFilename,
            format!("Invalid file name '{filename}'"),
        ));
    }

    let item_type = value(Field::Type);
    let category = Category::parse(item_type);
    if !category.is_known() {
        return LineOutcome::Rejected(field_error(
            line,
            &fields,
            layout,
            Field::Type,
            ErrorKind::InvalidType,
            format!("Unknown type '{item_type}'"),
        ));
    }

    let date = value(Field::Date);
    if !is_valid_date(date) {
        return LineOutcome::Rejected(field_error(
            line,
            &fields,
            layout,
            Field::Date,
            ErrorKind::InvalidDate,
            format!("Invalid date format '{date}'"),
        ));
    }

    let tags = parse_tags(value(Field::Tags));
    let item = ArchiveItem {
        filename: filename.to_owned(),
        item_type: item_type.to_owned(),
        category,
        title: value(Field::Title).to_owned(),
        description: value(Field::Description).to_owned(),
        date: date.to_owned(),
        tags,
        line_number: line.line_number,
    };

    if has_minimum_tags(&item.tags, min_tags) {
        return LineOutcome::Accepted(item);
    }

    let warning = field_error(
        line,
        &fields,
        layout,
        Field::Tags,
        ErrorKind::InsufficientTags,
        format!("Not enough tags: {} of {min_tags}", item.tags.len()),
    );
    LineOutcome::AcceptedWithWarning(item, replace_tags_hint(warning, min_tags))
}

/// Diagnostic for a line that could not be split into fields.
fn tokenize_error(line: ManifestLine<'_>, err: TokenizeError) -> ValidationError {
    match err {
        TokenizeError::MalformedDelimiter => ValidationError::new(
            ErrorKind::MalformedDelimiter,
            line.line_number,
            line.raw,
            "Malformed delimiter: fields must be separated by ' | ' (space, pipe, space)",
            LINE_FORMAT,
        ),
        TokenizeError::InsufficientFields { found } => {
            let fields: Vec<&str> = line.raw.split(DELIMITER).map(str::trim).collect();
            ValidationError::new(
                ErrorKind::InsufficientFields,
                line.line_number,
                line.raw,
                format!("Missing fields: found {found}, need at least {MIN_FIELDS}"),
                LINE_FORMAT,
            )
            .with_parts(missing_field_parts(&fields))
        }
    }
}

/// Which field each column holds, for a line with `count` fields.
fn field_layout(count: usize) -> &'static [Field] {
    const FOUR: &[Field] = &[Field::Filename, Field::Type, Field::Title, Field::Date];
    const FIVE: &[Field] = &[
        Field::Filename,
        Field::Type,
        Field::Title,
        Field::Description,
        Field::Date,
    ];
    const SIX: &[Field] = &[
        Field::Filename,
        Field::Type,
        Field::Title,
        Field::Description,
        Field::Date,
        Field::Tags,
    ];
    match count {
        0..=4 => FOUR,
        5 => FIVE,
        _ => SIX,
    }
}

fn expected_for(field: Field) -> String {
    match field {
        Field::Filename => {
            "file name without path separators, <>:\"/\\|?* or reserved device names".to_owned()
        }
        Field::Type => format!("one of: {}", Category::vocabulary()),
        Field::Title | Field::Description => "free text".to_owned(),
        Field::Date => format!("one of: {}", DateFormat::all_templates()),
        Field::Tags => "comma-separated tags".to_owned(),
    }
}

/// Diagnostic for a line whose `failing` field did not validate.
fn field_error(
    line: ManifestLine<'_>,
    fields: &[&str],
    layout: &[Field],
    failing: Field,
    kind: ErrorKind,
    message: String,
) -> ValidationError {
    let mut parts: Vec<ProblematicPart> = layout
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let part = fields.get(index).copied().unwrap_or("");
            ProblematicPart {
                index,
                part: part.to_owned(),
                field: *field,
                is_empty: part.is_empty(),
                is_problematic: *field == failing,
                expected: expected_for(*field),
            }
        })
        .collect();

    // An absent tags column is still the problem for a short tag list.
    if failing == Field::Tags && !layout.contains(&Field::Tags) {
        parts.push(ProblematicPart {
            index: layout.len(),
            part: String::new(),
            field: Field::Tags,
            is_empty: true,
            is_problematic: true,
            expected: expected_for(Field::Tags),
        });
    }

    ValidationError::new(
        kind,
        line.line_number,
        line.raw,
        message,
        expected_for(failing),
    )
    .with_parts(parts)
}

fn replace_tags_hint(mut warning: ValidationError, min_tags: usize) -> ValidationError {
    let hint = format!("at least {min_tags} comma-separated tags");
    for part in &mut warning.problematic_parts {
        if part.field == Field::Tags {
            part.expected.clone_from(&hint);
        }
    }
    warning.expected_format = hint;
    warning
}

/// Annotations for a line that is too short: present fields are kept,
/// absent required ones are flagged.
fn missing_field_parts(fields: &[&str]) -> Vec<ProblematicPart> {
    field_layout(MIN_FIELDS)
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let part = fields.get(index).copied().unwrap_or("");
            let missing = index >= fields.len();
            ProblematicPart {
                index,
                part: part.to_owned(),
                field: *field,
                is_empty: part.is_empty(),
                is_problematic: missing,
                expected: expected_for(*field),
            }
        })
        .collect()
}
