use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use capsule_validator::{
    CapsuleReport, Category, DEFAULT_MANIFEST_NAME, Severity, ValidationConfig, ValidationError,
    output, validate_path,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "capsule",
    version,
    about = "Validate and browse digital time capsule archives"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a capsule and report diagnostics
    Validate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// List the items of a capsule with inline diagnostics
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Only show items of this category (manifest label, any case)
        #[arg(long, value_name = "LABEL")]
        category: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Capsule ZIP file or extracted directory
    pub path: PathBuf,

    /// Manifest file name inside the capsule
    #[arg(long, default_value = DEFAULT_MANIFEST_NAME)]
    pub manifest: String,

    /// Minimum number of tags per item
    #[arg(long, default_value_t = 5)]
    pub min_tags: usize,
}

impl SourceArgs {
    fn config(&self) -> ValidationConfig {
        let mut config = ValidationConfig::default();
        config.manifest_name.clone_from(&self.manifest);
        config.min_tags = self.min_tags;
        config.requirements.min_tags_per_item = self.min_tags;
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Parse the process arguments and run.
///
/// Returns the process exit code: 0 when the capsule is valid, 1 otherwise.
///
/// # Errors
///
/// Returns an error if the capsule cannot be opened or output fails.
pub fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let stdout = std::io::stdout();
    execute(&cli, &mut stdout.lock())
}

/// Run a parsed command, writing to `out`.
///
/// # Errors
///
/// Returns an error if the capsule cannot be opened or output fails.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<i32> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    match &cli.command {
        Command::Validate { source, format } => {
            let _span =
                tracing::info_span!("validate", path = %source.path.display()).entered();
            let report = load(source)?;
            match format {
                OutputFormat::Json => output::write_json(&report, out)?,
                OutputFormat::Human => {
                    output::write_human(&report, out)?;
                    write_verdict(&report, out)?;
                }
            }
            Ok(exit_code(&report))
        }
        Command::List { source, category } => {
            let _span = tracing::info_span!("list", path = %source.path.display()).entered();
            let filter = category.as_deref().map(parse_category).transpose()?;
            let report = load(source)?;
            write_listing(&report, filter, out)?;
            Ok(exit_code(&report))
        }
    }
}

fn load(source: &SourceArgs) -> anyhow::Result<CapsuleReport> {
    validate_path(&source.path, &source.config())
        .with_context(|| format!("Failed to validate {}", source.path.display()))
}

fn parse_category(label: &str) -> anyhow::Result<Category> {
    let category = Category::parse(label);
    if !category.is_known() {
        anyhow::bail!(
            "Unknown category '{label}', expected one of: {}",
            Category::vocabulary()
        );
    }
    Ok(category)
}

fn exit_code(report: &CapsuleReport) -> i32 {
    tracing::info!(
        items = report.items.len(),
        errors = report.errors_count(),
        warnings = report.warnings_count(),
        requirements_met = report.requirements.is_valid,
        "capsule checked"
    );
    i32::from(!report.ok)
}

fn write_verdict(report: &CapsuleReport, out: &mut dyn Write) -> anyhow::Result<()> {
    let verdict = if report.ok {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    writeln!(
        out,
        "{verdict} {} item(s), {} error(s), {} warning(s)",
        report.items.len(),
        report.errors_count(),
        report.warnings_count()
    )?;
    Ok(())
}

fn write_diagnostic(error: &ValidationError, out: &mut dyn Write) -> anyhow::Result<()> {
    let marker = match error.severity() {
        Severity::Error => "\u{2717}".red(),
        Severity::Warning => "!".yellow(),
    };
    writeln!(out, "   {marker} [{}] {}", error.category(), error.error)?;
    Ok(())
}

fn write_listing(
    report: &CapsuleReport,
    filter: Option<Category>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut shown = 0usize;
    for item in &report.items {
        if filter.is_some_and(|c| c != item.category) {
            continue;
        }
        shown += 1;
        writeln!(
            out,
            "{} {} {} {}",
            item.category.emoji(),
            item.category.label().cyan(),
            item.date.dimmed(),
            item.display_title().bold()
        )?;
        writeln!(out, "   {}", item.filename)?;
        if !item.tags.is_empty() {
            writeln!(out, "   #{}", item.tags.join(" #"))?;
        }
        for error in report
            .errors
            .iter()
            .filter(|e| e.line_number == item.line_number)
        {
            write_diagnostic(error, out)?;
        }
    }

    let rejected: Vec<&ValidationError> = report
        .errors
        .iter()
        .filter(|e| !report.items.iter().any(|i| i.line_number == e.line_number))
        .collect();
    if filter.is_none() && !rejected.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Rejected manifest lines:".bold())?;
        for error in rejected {
            writeln!(out, "  line {}: {}", error.line_number, error.line)?;
            write_diagnostic(error, out)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{shown} of {} item(s) shown", report.items.len())?;
    Ok(())
}
