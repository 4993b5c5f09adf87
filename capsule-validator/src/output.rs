//! Shared output formatting for capsule reports.
//!
//! Provides JSON and plain-text formatters for `CapsuleReport`.
//! Color/terminal formatting is left to the CLI layer.

use std::io::Write;

use crate::report::CapsuleReport;

/// Format a `CapsuleReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &CapsuleReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `CapsuleReport` as human-readable plain text to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &CapsuleReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  TIME CAPSULE VALIDATOR")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    if let Some(path) = &report.manifest_path {
        writeln!(writer, "  Manifest:       {path}")?;
    }
    writeln!(writer, "  Archive files:  {}", report.archive_files)?;
    writeln!(writer, "  Items:          {}", report.items.len())?;
    writeln!(writer, "  Errors:         {}", report.errors_count())?;
    writeln!(writer, "  Warnings:       {}", report.warnings_count())?;
    writeln!(writer)?;

    if !report.errors.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  DIAGNOSTICS")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for error in &report.errors {
            writeln!(
                writer,
                "{}: {}",
                error.severity(),
                error.format_human_readable()
            )?;
            writeln!(writer, "    expected: {}", error.expected_format)?;
        }
        writeln!(writer)?;
    }

    let req = &report.requirements;
    writeln!(writer, "{}", "-".repeat(80))?;
    writeln!(writer, "  REQUIREMENTS")?;
    writeln!(writer, "{}", "-".repeat(80))?;
    writeln!(
        writer,
        "  news:      {:>3} / {}",
        req.news_count, req.requirements.min_news
    )?;
    writeln!(
        writer,
        "  media:     {:>3} / {}",
        req.media_count, req.requirements.min_media
    )?;
    writeln!(
        writer,
        "  personal:  {:>3} / {}",
        req.personal_count, req.requirements.min_personal
    )?;
    writeln!(
        writer,
        "  items with fewer than {} tags: {}",
        req.requirements.min_tags_per_item, req.items_below_tag_minimum
    )?;
    writeln!(writer)?;

    writeln!(writer, "{}", "=".repeat(80))?;
    if report.ok {
        writeln!(
            writer,
            "\u{2713} All {} items passed validation",
            report.items.len()
        )?;
    } else {
        if report.errors_count() > 0 {
            writeln!(
                writer,
                "\u{2717} {} error(s) found in manifest or archive",
                report.errors_count()
            )?;
        }
        if !req.is_valid {
            writeln!(writer, "\u{2717} Archive requirements not met")?;
            for unmet in req.to_errors() {
                writeln!(writer, "    - {}", unmet.error)?;
            }
        }
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}
