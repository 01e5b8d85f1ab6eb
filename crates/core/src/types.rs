//! Request, invocation and execution types shared across crates.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote parameter map: each parameter name maps to an ordered list of
/// values, which is the shape the automation engine accepts even for
/// scalar inputs.
pub type BoundParameters = BTreeMap<String, Vec<String>>;

/// Raw output payload of a single step, keyed by output name.
pub type StepOutputs = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// TroubleshootingRequest
// ---------------------------------------------------------------------------

/// A caller's request to run one troubleshooting scenario.
///
/// Parameters the scenario does not bind are ignored so that newer callers
/// can send extra fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroubleshootingRequest {
    pub scenario: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl TroubleshootingRequest {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Builder-style helper for adding one caller parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// WorkflowInvocation
// ---------------------------------------------------------------------------

/// One remote execution of a workflow.
///
/// The execution handle is only known after the launch succeeds, so an
/// invocation starts without one and gains it exactly once via
/// [`WorkflowInvocation::launched`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInvocation {
    workflow_id: String,
    parameters: BoundParameters,
    execution_id: Option<String>,
}

impl WorkflowInvocation {
    pub fn new(workflow_id: impl Into<String>, parameters: BoundParameters) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            parameters,
            execution_id: None,
        }
    }

    /// Consume the unlaunched invocation and attach the engine's handle.
    pub fn launched(self, execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: Some(execution_id.into()),
            ..self
        }
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn parameters(&self) -> &BoundParameters {
        &self.parameters
    }

    pub fn execution_id(&self) -> Option<&str> {
        self.execution_id.as_deref()
    }
}

// ---------------------------------------------------------------------------
// ExecutionStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a remote execution as seen by this system.
///
/// `TimedOut` is never reported by the engine; the poller assigns it when
/// its own deadline elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    Cancelled,
    TimedOut,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Pending | ExecutionStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "Pending",
            ExecutionStatus::InProgress => "InProgress",
            ExecutionStatus::Success => "Success",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Cancelled => "Cancelled",
            ExecutionStatus::TimedOut => "TimedOut",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StepResult
// ---------------------------------------------------------------------------

/// Outcome of a single workflow step.
///
/// `Incomplete` covers steps the engine lists but has not finished
/// (pending, waiting or still running).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepOutcome {
    Success,
    Failed,
    Skipped,
    Incomplete,
}

impl StepOutcome {
    /// Whether the step ran to an end, successfully or not.
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Success | StepOutcome::Failed)
    }
}

/// A named step of an execution with its raw outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub outcome: StepOutcome,
    /// `None` when the engine reported no outputs at all for the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<StepOutputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl StepResult {
    pub fn new(name: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            outputs: None,
            failure_message: None,
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.outputs
            .get_or_insert_with(StepOutputs::new)
            .insert(key.into(), value);
        self
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ExecutionSnapshot
// ---------------------------------------------------------------------------

/// Everything known about an execution at the point polling stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub status: ExecutionStatus,
    /// Steps in execution order.
    pub steps: Vec<StepResult>,
    /// Execution-level failure message, if the engine reported one.
    pub failure_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionSnapshot {
    pub fn new(status: ExecutionStatus, steps: Vec<StepResult>) -> Self {
        Self {
            status,
            steps,
            failure_message: None,
            started_at: None,
            finished_at: None,
        }
    }
}
