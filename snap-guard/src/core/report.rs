//! Findings, reports and batch results.

use super::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One result of a validation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The severity of the finding
    pub severity: Severity,
    /// The name of the check that produced it
    pub check: String,
    /// Human-readable description
    pub message: String,
}

impl Finding {
    /// Creates a new finding.
    pub fn new(severity: Severity, check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            check: check.into(),
            message: message.into(),
        }
    }

    /// Creates an `Info` finding.
    pub fn info(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, check, message)
    }

    /// Creates a `Warning` finding.
    pub fn warning(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, check, message)
    }

    /// Creates an `Issue` finding.
    pub fn issue(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Issue, check, message)
    }
}

/// The overall quality verdict derived from a report's findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportStatus {
    /// No warnings and no issues
    Excellent,
    /// Warnings but no issues
    Good {
        /// Number of warnings
        warnings: usize,
    },
    /// At least one issue
    IssuesFound {
        /// Number of issues
        issues: usize,
        /// Number of warnings
        warnings: usize,
    },
}

impl ReportStatus {
    /// Returns the marker matching the worst severity of the status.
    pub fn symbol(&self) -> &'static str {
        match self {
            ReportStatus::Excellent => Severity::Info.symbol(),
            ReportStatus::Good { .. } => Severity::Warning.symbol(),
            ReportStatus::IssuesFound { .. } => Severity::Issue.symbol(),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Excellent => write!(f, "EXCELLENT"),
            ReportStatus::Good { warnings } => write!(f, "GOOD ({warnings} warnings)"),
            ReportStatus::IssuesFound { issues, warnings } => {
                write!(f, "ISSUES FOUND ({issues} issues, {warnings} warnings)")
            }
        }
    }
}

/// The ordered findings of one validation run against one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Display name of the dataset (usually its file name)
    pub dataset: String,
    /// Findings in the order they were produced
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Creates an empty report.
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            findings: Vec::new(),
        }
    }

    /// Appends a finding.
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Appends several findings, keeping their order.
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    /// Returns the findings of one severity, in production order.
    pub fn findings_by_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |finding| finding.severity == severity)
    }

    /// Counts findings of one severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.findings_by_severity(severity).count()
    }

    /// Returns true if there is at least one `Issue`.
    pub fn has_issues(&self) -> bool {
        self.count(Severity::Issue) > 0
    }

    /// Returns true if there is at least one `Warning`.
    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }

    /// Derives the overall status of the report.
    pub fn status(&self) -> ReportStatus {
        let issues = self.count(Severity::Issue);
        let warnings = self.count(Severity::Warning);
        if issues > 0 {
            ReportStatus::IssuesFound { issues, warnings }
        } else if warnings > 0 {
            ReportStatus::Good { warnings }
        } else {
            ReportStatus::Excellent
        }
    }
}

/// The outcome for one dataset in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DatasetOutcome {
    /// The dataset was validated
    Validated {
        /// The profile the dataset was validated with
        profile: String,
        /// The resulting report
        report: ValidationReport,
    },
    /// The dataset file was not present and was skipped
    Missing {
        /// The file name that was looked for
        file_name: String,
    },
}

impl DatasetOutcome {
    /// Returns the report, if the dataset was validated.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            DatasetOutcome::Validated { report, .. } => Some(report),
            DatasetOutcome::Missing { .. } => None,
        }
    }
}

/// The combined result of validating several datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Outcomes in the order the datasets were processed
    pub outcomes: Vec<DatasetOutcome>,
}

impl BatchReport {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an outcome.
    pub fn push(&mut self, outcome: DatasetOutcome) {
        self.outcomes.push(outcome);
    }

    /// Iterates over the reports of validated datasets.
    pub fn reports(&self) -> impl Iterator<Item = &ValidationReport> {
        self.outcomes.iter().filter_map(DatasetOutcome::report)
    }

    /// Returns true if any validated dataset has an `Issue`.
    pub fn has_issues(&self) -> bool {
        self.reports().any(ValidationReport::has_issues)
    }
}
