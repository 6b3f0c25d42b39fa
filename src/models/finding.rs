//! Validation findings and the per-call outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::breakdown::{PayBreakdown, PayrollReport};

/// How serious a finding is. Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Regulatory-floor or base-ordering violation.
    Critical,
    /// Internal arithmetic mismatch.
    Error,
    /// Plausibility or audit divergence.
    Warning,
    /// Informational note.
    Info,
}

impl Severity {
    /// True for CRITICAL and ERROR.
    pub fn invalidates(self) -> bool {
        matches!(self, Severity::Critical | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        };
        f.write_str(label)
    }
}

/// A single (severity, code, message) finding.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Finding, Severity};
///
/// let finding = Finding::warning("TAX_RATE_HIGH", "effective tax rate 31.20% above 30%");
/// assert_eq!(finding.severity, Severity::Warning);
/// assert_eq!(finding.to_string(), "WARNING TAX_RATE_HIGH: effective tax rate 31.20% above 30%");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Severity.
    pub severity: Severity,
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl Finding {
    /// Creates a finding.
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
        }
    }

    /// A CRITICAL finding.
    pub fn critical(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, code, message)
    }

    /// An ERROR finding.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// A WARNING finding.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// An INFO finding.
    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.code, self.message)
    }
}

/// Ordered findings plus the validity summary.
///
/// `is_valid` is false as soon as any CRITICAL or ERROR finding is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    is_valid: bool,
    findings: Vec<Finding>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            findings: Vec::new(),
        }
    }
}

impl ValidationResult {
    /// Creates an empty, valid result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finding.
    pub fn push(&mut self, finding: Finding) {
        if finding.severity.invalidates() {
            self.is_valid = false;
        }
        self.findings.push(finding);
    }

    /// Appends several findings in order.
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    /// True when no CRITICAL or ERROR finding was recorded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// All findings in the order they were raised.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// True if a finding with this code was raised.
    pub fn has_code(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }

    /// Findings of one severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// The first finding of the given severity, if any.
    pub fn first(&self, severity: Severity) -> Option<&Finding> {
        self.with_severity(severity).next()
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// True if there are no findings.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// The result of one successful orchestration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollOutcome {
    /// Unique identifier of this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced it.
    pub engine_version: String,
    /// Region the rules were taken from.
    pub region: String,
    /// Sector the rules were taken from.
    pub sector: String,
    /// Full-precision figures.
    pub breakdown: PayBreakdown,
    /// Coherence and audit findings.
    pub validation: ValidationResult,
}

impl PayrollOutcome {
    /// The rounded report view of the breakdown.
    pub fn report(&self) -> PayrollReport {
        self.breakdown.report()
    }
}
