//! Report rendering.
//!
//! Three formatters share the [`ReportFormatter`] trait:
//!
//! - [`HumanFormatter`]: the boxed console report, grouped by severity
//! - [`JsonFormatter`]: structured output with the derived status and counts
//! - [`MarkdownFormatter`]: headings and bullet lists for documentation
//!
//! All output is a pure function of the report. No timestamps or timings
//! are included, so rendering the same report twice gives identical text.
//!
//! # Examples
//!
//! ```rust
//! use snap_guard::core::{Finding, ValidationReport};
//! use snap_guard::formatters::{HumanFormatter, ReportFormatter};
//!
//! let mut report = ValidationReport::new("sample.csv");
//! report.push(Finding::info("load", "Loaded 3 records from sample.csv"));
//!
//! let text = HumanFormatter::new().format(&report).unwrap();
//! assert!(text.contains("✓ DATA QUALITY: EXCELLENT"));
//! ```

use crate::core::{BatchReport, DatasetOutcome, Finding, ReportStatus, Severity, ValidationReport};
use crate::prelude::*;
use serde::Serialize;
use std::fmt::Write;

const RULE_WIDTH: usize = 70;

/// Options shared by the formatters.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Colorize the status line (human formatter only)
    pub use_colors: bool,
    /// Include `Info` findings
    pub include_info: bool,
    /// Maximum findings listed per severity; `None` lists all
    pub max_findings: Option<usize>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            use_colors: false,
            include_info: true,
            max_findings: None,
        }
    }
}

impl FormatterConfig {
    /// Problems only, capped for build logs.
    pub fn ci() -> Self {
        Self {
            use_colors: false,
            include_info: false,
            max_findings: Some(50),
        }
    }

    /// Sets whether to colorize output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Sets whether `Info` findings are shown.
    pub fn with_info(mut self, include_info: bool) -> Self {
        self.include_info = include_info;
        self
    }

    /// Caps the number of findings listed per severity.
    pub fn with_max_findings(mut self, max: usize) -> Self {
        self.max_findings = Some(max);
        self
    }

    fn shows(&self, severity: Severity) -> bool {
        self.include_info || severity.is_at_least(Severity::Warning)
    }

    /// Splits findings into the listed ones and the number left out.
    fn visible<'a>(&self, findings: Vec<&'a Finding>) -> (Vec<&'a Finding>, usize) {
        match self.max_findings {
            Some(max) if findings.len() > max => {
                let hidden = findings.len() - max;
                (findings.into_iter().take(max).collect(), hidden)
            }
            _ => (findings, 0),
        }
    }
}

/// Converts reports into text.
///
/// Implementors provide [`format`](ReportFormatter::format); batch
/// rendering joins the per-dataset output with a blank line.
///
/// # Examples
///
/// ```rust
/// use snap_guard::core::ValidationReport;
/// use snap_guard::formatters::ReportFormatter;
///
/// struct StatusOnly;
///
/// impl ReportFormatter for StatusOnly {
///     fn format(&self, report: &ValidationReport) -> snap_guard::prelude::Result<String> {
///         Ok(format!("{}: {}\n", report.dataset, report.status()))
///     }
/// }
///
/// let text = StatusOnly.format(&ValidationReport::new("a.csv")).unwrap();
/// assert_eq!(text, "a.csv: EXCELLENT\n");
/// ```
pub trait ReportFormatter {
    /// Formats one report.
    fn format(&self, report: &ValidationReport) -> Result<String>;

    /// Formats the note for a dataset whose file was not found.
    fn format_missing(&self, file_name: &str) -> Result<String> {
        Ok(format!(
            "{} File not found: {file_name}\n",
            Severity::Issue.symbol()
        ))
    }

    /// Formats every outcome of a batch, separated by blank lines.
    fn format_batch(&self, batch: &BatchReport) -> Result<String> {
        let parts = batch
            .outcomes
            .iter()
            .map(|outcome| match outcome {
                DatasetOutcome::Validated { report, .. } => self.format(report),
                DatasetOutcome::Missing { file_name } => self.format_missing(file_name),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join("\n"))
    }
}

fn section_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Issue => "CRITICAL ISSUES",
        Severity::Warning => "WARNINGS",
        Severity::Info => "INFORMATION",
    }
}

/// The console report: a banner, the status line, then one block per
/// severity that has findings, worst first.
///
/// ```text
/// ======================================================================
/// VALIDATION REPORT: monthly.csv
/// ======================================================================
///
/// ⚠ DATA QUALITY: GOOD (1 warnings)
///
/// WARNINGS:
/// ----------------------------------------------------------------------
/// ⚠ Household: 1 negative values
///
/// INFORMATION:
/// ----------------------------------------------------------------------
/// ✓ Loaded 12 records from monthly.csv
///
/// ======================================================================
/// ```
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with the given options.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn status_line(&self, status: &ReportStatus) -> String {
        let line = format!("{} DATA QUALITY: {status}", status.symbol());
        if !self.config.use_colors {
            return line;
        }
        let color = match status {
            ReportStatus::Excellent => "32",
            ReportStatus::Good { .. } => "33",
            ReportStatus::IssuesFound { .. } => "31",
        };
        format!("\x1b[{color}m{line}\x1b[0m")
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let mut output = String::new();

        writeln!(output, "{heavy}").unwrap();
        writeln!(output, "VALIDATION REPORT: {}", report.dataset).unwrap();
        writeln!(output, "{heavy}").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "{}", self.status_line(&report.status())).unwrap();
        writeln!(output).unwrap();

        for severity in Severity::RENDER_ORDER {
            if !self.config.shows(severity) {
                continue;
            }
            let findings: Vec<_> = report.findings_by_severity(severity).collect();
            if findings.is_empty() {
                continue;
            }

            let (listed, hidden) = self.config.visible(findings);
            writeln!(output, "{}:", section_title(severity)).unwrap();
            writeln!(output, "{light}").unwrap();
            for finding in listed {
                writeln!(output, "{} {}", severity.symbol(), finding.message).unwrap();
            }
            if hidden > 0 {
                writeln!(output, "... and {hidden} more").unwrap();
            }
            writeln!(output).unwrap();
        }

        writeln!(output, "{heavy}").unwrap();
        Ok(output)
    }
}

#[derive(Serialize)]
struct ReportView<'a> {
    dataset: &'a str,
    status: &'static str,
    summary: String,
    issues: usize,
    warnings: usize,
    info: usize,
    findings: Vec<&'a Finding>,
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum OutcomeView<'a> {
    Validated {
        profile: &'a str,
        report: ReportView<'a>,
    },
    Missing {
        file_name: &'a str,
    },
}

/// Structured JSON output.
///
/// Each report carries its derived status (`excellent`, `good` or
/// `issues_found`), a readable summary and per-severity counts. Batches
/// become an array of tagged outcomes.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    /// Creates a pretty-printing formatter.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a formatter with the given options.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to pretty-print.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn view<'a>(&self, report: &'a ValidationReport) -> ReportView<'a> {
        let status = report.status();
        let findings = report
            .findings
            .iter()
            .filter(|finding| self.config.shows(finding.severity))
            .collect();
        ReportView {
            dataset: &report.dataset,
            status: match status {
                ReportStatus::Excellent => "excellent",
                ReportStatus::Good { .. } => "good",
                ReportStatus::IssuesFound { .. } => "issues_found",
            },
            summary: status.to_string(),
            issues: report.count(Severity::Issue),
            warnings: report.count(Severity::Warning),
            info: report.count(Severity::Info),
            findings,
        }
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let mut text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        text.push('\n');
        Ok(text)
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.render(&self.view(report))
    }

    fn format_missing(&self, file_name: &str) -> Result<String> {
        self.render(&OutcomeView::Missing { file_name })
    }

    fn format_batch(&self, batch: &BatchReport) -> Result<String> {
        let outcomes: Vec<_> = batch
            .outcomes
            .iter()
            .map(|outcome| match outcome {
                DatasetOutcome::Validated { profile, report } => OutcomeView::Validated {
                    profile,
                    report: self.view(report),
                },
                DatasetOutcome::Missing { file_name } => OutcomeView::Missing { file_name },
            })
            .collect();
        self.render(&outcomes)
    }
}

/// Markdown output for READMEs and CI summaries.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownFormatter {
    /// Creates a formatter with level-2 report headings.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    /// Creates a formatter with the given options.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the heading level of each report, between 1 and 5.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let h = "#".repeat(self.heading_level as usize);
        let status = report.status();
        let mut output = String::new();

        writeln!(output, "{h} Validation Report: {}", report.dataset).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Status:** {} {status}", status.symbol()).unwrap();
        writeln!(output).unwrap();

        for severity in Severity::RENDER_ORDER {
            if !self.config.shows(severity) {
                continue;
            }
            let findings: Vec<_> = report.findings_by_severity(severity).collect();
            if findings.is_empty() {
                continue;
            }

            let title = match severity {
                Severity::Issue => "Critical Issues",
                Severity::Warning => "Warnings",
                Severity::Info => "Information",
            };
            let (listed, hidden) = self.config.visible(findings);
            writeln!(output, "{h}# {title}").unwrap();
            writeln!(output).unwrap();
            for finding in listed {
                writeln!(output, "- {} {}", severity.symbol(), finding.message).unwrap();
            }
            if hidden > 0 {
                writeln!(output, "- _... and {hidden} more_").unwrap();
            }
            writeln!(output).unwrap();
        }

        Ok(output)
    }

    fn format_missing(&self, file_name: &str) -> Result<String> {
        Ok(format!(
            "> {} File not found: `{file_name}`\n",
            Severity::Issue.symbol()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ValidationReport {
        let mut report = ValidationReport::new("monthly.csv");
        report.push(Finding::info("load", "Loaded 12 records from monthly.csv"));
        report.push(Finding::warning("numeric", "Household: 1 negative values"));
        report.push(Finding::info("dates", "All dates valid"));
        report
    }

    #[test]
    fn test_human_layout() {
        let text = HumanFormatter::new().format(&sample_report()).unwrap();
        let heavy = "=".repeat(70);
        let light = "-".repeat(70);
        let expected = format!(
            "{heavy}\nVALIDATION REPORT: monthly.csv\n{heavy}\n\n\
             ⚠ DATA QUALITY: GOOD (1 warnings)\n\n\
             WARNINGS:\n{light}\n⚠ Household: 1 negative values\n\n\
             INFORMATION:\n{light}\n✓ Loaded 12 records from monthly.csv\n✓ All dates valid\n\n\
             {heavy}\n"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_human_issue_section_first() {
        let mut report = sample_report();
        report.push(Finding::issue("schema", "Missing columns: 'Cost'"));
        let text = HumanFormatter::new().format(&report).unwrap();

        assert!(text.contains("✗ DATA QUALITY: ISSUES FOUND (1 issues, 1 warnings)"));
        let issues = text.find("CRITICAL ISSUES:").unwrap();
        let warnings = text.find("WARNINGS:").unwrap();
        let info = text.find("INFORMATION:").unwrap();
        assert!(issues < warnings && warnings < info);
    }

    #[test]
    fn test_human_colors_and_limits() {
        let config = FormatterConfig::default()
            .with_colors(true)
            .with_max_findings(1);
        let text = HumanFormatter::with_config(config)
            .format(&sample_report())
            .unwrap();

        assert!(text.contains("\x1b[33m⚠ DATA QUALITY: GOOD (1 warnings)\x1b[0m"));
        assert!(text.contains("... and 1 more"));
    }

    #[test]
    fn test_ci_config_hides_info() {
        let text = HumanFormatter::with_config(FormatterConfig::ci())
            .format(&sample_report())
            .unwrap();
        assert!(!text.contains("INFORMATION:"));
        assert!(text.contains("WARNINGS:"));
    }

    #[test]
    fn test_json_includes_status_and_counts() {
        let text = JsonFormatter::new().format(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["dataset"], "monthly.csv");
        assert_eq!(value["status"], "good");
        assert_eq!(value["summary"], "GOOD (1 warnings)");
        assert_eq!(value["warnings"], 1);
        assert_eq!(value["info"], 2);
        assert_eq!(value["findings"][1]["severity"], "warning");
    }

    #[test]
    fn test_json_batch_is_array() {
        let mut batch = BatchReport::new();
        batch.push(DatasetOutcome::Validated {
            profile: "monthly".to_string(),
            report: sample_report(),
        });
        batch.push(DatasetOutcome::Missing {
            file_name: "County Bi-Annual SNAP 89-21.csv".to_string(),
        });

        let text = JsonFormatter::new().with_pretty(false).format_batch(&batch).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value[0]["outcome"], "validated");
        assert_eq!(value[0]["report"]["status"], "good");
        assert_eq!(value[1]["outcome"], "missing");
        assert_eq!(value[1]["file_name"], "County Bi-Annual SNAP 89-21.csv");
    }

    #[test]
    fn test_human_batch_joins_with_blank_line() {
        let mut batch = BatchReport::new();
        batch.push(DatasetOutcome::Missing {
            file_name: "absent.csv".to_string(),
        });
        batch.push(DatasetOutcome::Validated {
            profile: "generic".to_string(),
            report: sample_report(),
        });

        let text = HumanFormatter::new().format_batch(&batch).unwrap();
        assert!(text.starts_with("✗ File not found: absent.csv\n\n====="));
    }

    #[test]
    fn test_markdown_sections() {
        let text = MarkdownFormatter::new().format(&sample_report()).unwrap();

        assert!(text.starts_with("## Validation Report: monthly.csv\n"));
        assert!(text.contains("**Status:** ⚠ GOOD (1 warnings)"));
        assert!(text.contains("### Warnings\n\n- ⚠ Household: 1 negative values\n"));
        assert!(!text.contains("### Critical Issues"));
    }
}
