//! snap-validate
//!
//! Validates SNAP data files and prints a quality report.
//!
//! Exit status: 0 when no issues were found, 1 when at least one dataset
//! has an issue, 2 on usage or configuration errors.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, ValueEnum};
use snap_guard::config::{ConfigFile, ValidatorConfig};
use snap_guard::core::DataValidator;
use snap_guard::formatters::{
    FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter, ReportFormatter,
};
use snap_guard::logging::setup::{init_logging, LoggingConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Markdown,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("target").required(true).args(["file", "all"])))]
struct Args {
    /// CSV file to validate
    file: Option<PathBuf>,

    /// Validate every known dataset in the data directory
    #[arg(long)]
    all: bool,

    /// Also write the report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Validate FILE with this profile instead of matching by name
    #[arg(long, conflicts_with = "all")]
    profile: Option<String>,

    /// Reference date for currency checks (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    as_of: Option<NaiveDate>,

    /// Directory holding the datasets
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Colorize the status line
    #[arg(long)]
    color: bool,

    /// Leave informational findings out of the report
    #[arg(long)]
    problems_only: bool,

    /// Build-log output: problems only, at most 50 findings per severity
    #[arg(long)]
    ci: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

fn build_config(args: &Args) -> Result<ValidatorConfig> {
    let mut config = ValidatorConfig::default();
    if let Some(path) = &args.config {
        config = ConfigFile::from_path(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?
            .apply(config)?;
    }
    if let Some(data_dir) = &args.data_dir {
        config = config.with_data_dir(data_dir);
    }
    if let Some(as_of) = args.as_of {
        config = config.with_as_of(as_of);
    }
    Ok(config)
}

fn build_validator(args: &Args) -> Result<DataValidator> {
    Ok(DataValidator::new(build_config(args)?)?)
}

fn formatter(args: &Args) -> Box<dyn ReportFormatter> {
    let config = if args.ci {
        FormatterConfig::ci()
    } else {
        FormatterConfig::default().with_info(!args.problems_only)
    }
    .with_colors(args.color);
    match args.format {
        OutputFormat::Human => Box::new(HumanFormatter::with_config(config)),
        OutputFormat::Json => Box::new(JsonFormatter::with_config(config)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::with_config(config)),
    }
}

/// Validates the requested datasets and emits the report. Returns whether
/// any issue was found.
async fn run(args: &Args, validator: &DataValidator) -> Result<bool> {
    let formatter = formatter(args);

    let (text, has_issues) = if args.all {
        let batch = validator.validate_all().await;
        (formatter.format_batch(&batch)?, batch.has_issues())
    } else {
        let file = args.file.as_ref().context("a FILE or --all is required")?;
        let (profile, report) = validator
            .validate_file(file, args.profile.as_deref())
            .await?;
        info!(file = %file.display(), profile = %profile, status = %report.status(), "Validated");
        (formatter.format(&report)?, report.has_issues())
    };

    print!("{text}");
    if let Some(path) = &args.output {
        std::fs::write(path, &text)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        debug!(path = %path.display(), "Report written");
    }

    Ok(has_issues)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logging = if args.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::quiet()
    };
    if let Err(e) = init_logging(logging.with_json_format(args.log_json)) {
        eprintln!("warning: logging disabled: {e}");
    }

    let validator = match build_validator(&args) {
        Ok(validator) => validator,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };

    match run(&args, &validator).await {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
