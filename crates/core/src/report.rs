//! Diagnostic report returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ExecutionStatus, StepOutputs};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One diagnostic observation derived from a step's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Step the observation came from.
    pub step: String,
    pub severity: Severity,
    pub message: String,
    /// Set when the run stopped before completing, so the finding may not
    /// reflect the full diagnosis.
    pub partial: bool,
}

/// Non-fatal problems encountered while building a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// The execution reached a terminal status but its step data was
    /// missing or did not match what the workflow should produce.
    ExtractionInconsistent { detail: String },
}

/// The normalized result of one troubleshooting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub scenario: String,
    pub workflow: String,
    pub execution_id: String,
    pub status: ExecutionStatus,
    pub summary: String,
    pub findings: Vec<Finding>,
    pub remediation: Vec<String>,
    /// Names of every step the execution reported, in order.
    pub steps: Vec<String>,
    /// Outputs of the workflow's report step, as the engine returned them.
    pub output: Option<StepOutputs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReportWarning>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DiagnosticReport {
    /// Whether any finding is at warning level or above.
    pub fn has_issues(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity >= Severity::Warning)
    }
}
