use crate::types::ExecutionStatus;

/// Failures a troubleshooting run can surface to its caller.
///
/// A timed-out run is not an error; it produces a report with
/// [`ExecutionStatus::TimedOut`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TroubleshootError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Unknown troubleshooting scenario: {0}")]
    UnknownScenario(String),

    #[error("Workflow launch rejected: {0}")]
    LaunchRejected(String),

    #[error("Polling failed (last known status: {last_known}): {reason}")]
    PollingFailed {
        last_known: ExecutionStatus,
        reason: String,
    },
}

impl TroubleshootError {
    /// Stable machine-readable error kind.
    pub fn code(&self) -> &'static str {
        match self {
            TroubleshootError::MissingParameter(_) => "MISSING_PARAMETER",
            TroubleshootError::UnknownScenario(_) => "UNKNOWN_SCENARIO",
            TroubleshootError::LaunchRejected(_) => "LAUNCH_REJECTED",
            TroubleshootError::PollingFailed { .. } => "POLLING_FAILED",
        }
    }
}
