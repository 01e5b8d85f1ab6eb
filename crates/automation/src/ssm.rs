//! AWS Systems Manager Automation implementation of [`WorkflowEngine`].
//!
//! Support Automation Workflow runbooks are SSM Automation documents, so
//! launching is `StartAutomationExecution` and polling is
//! `GetAutomationExecution`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::types::{AutomationExecution, StepExecution};
use aws_sdk_ssm::Client;
use chrono::{DateTime, Utc};
use saw_core::types::{
    BoundParameters, ExecutionSnapshot, ExecutionStatus, StepOutcome, StepOutputs, StepResult,
};

use crate::engine::{EngineError, WorkflowEngine};

/// Error codes the service uses for rate limiting and server-side faults.
const TRANSIENT_ERROR_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "TooManyUpdates",
    "InternalServerError",
    "ServiceUnavailable",
];

/// SSM Automation client wrapper.
pub struct SsmAutomationEngine {
    client: Client,
}

impl SsmAutomationEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration (environment,
    /// profile, or the execution role when hosted).
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(Client::from_conf(client_config(&sdk_config)))
    }
}

/// SSM client configuration with SDK-level retries disabled.
///
/// Launches must surface throttling immediately and status queries are
/// retried by the poller alone, so every call makes exactly one attempt.
pub fn client_config(sdk_config: &SdkConfig) -> aws_sdk_ssm::Config {
    aws_sdk_ssm::config::Builder::from(sdk_config)
        .retry_config(RetryConfig::disabled())
        .build()
}

#[async_trait]
impl WorkflowEngine for SsmAutomationEngine {
    async fn start_execution(
        &self,
        workflow_id: &str,
        parameters: &BoundParameters,
    ) -> Result<String, EngineError> {
        let parameters: HashMap<String, Vec<String>> = parameters
            .iter()
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();

        // A fresh token per launch; a replayed request with the same token
        // cannot start a second execution.
        let output = self
            .client
            .start_automation_execution()
            .document_name(workflow_id)
            .set_parameters(Some(parameters))
            .client_token(uuid::Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(classify_sdk_error)?;

        output
            .automation_execution_id()
            .map(str::to_string)
            .ok_or_else(|| EngineError::Rejected("engine returned no execution id".to_string()))
    }

    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionSnapshot, EngineError> {
        let output = self
            .client
            .get_automation_execution()
            .automation_execution_id(execution_id)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let execution = output.automation_execution().ok_or_else(|| {
            EngineError::Transient(format!("no execution body returned for {execution_id}"))
        })?;

        let snapshot = snapshot_from_execution(execution);
        tracing::debug!(
            execution_id,
            status = %snapshot.status,
            steps = ?snapshot.steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "Fetched automation execution",
        );
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

/// Map an SDK error to an [`EngineError`], keeping only its message.
fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> EngineError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            EngineError::Transient(message)
        }
        _ if err.code().is_some_and(is_transient_code) => EngineError::Transient(message),
        _ => EngineError::Rejected(message),
    }
}

pub fn is_transient_code(code: &str) -> bool {
    TRANSIENT_ERROR_CODES.contains(&code)
}

// ---------------------------------------------------------------------------
// Status mapping
// ---------------------------------------------------------------------------

/// Map an SSM automation execution status onto [`ExecutionStatus`].
///
/// A remote `TimedOut` means a step exceeded its own timeout, which is a
/// failed run; local `TimedOut` is reserved for the poller's deadline.
/// Unrecognized statuses are treated as still running.
pub fn map_execution_status(raw: &str) -> ExecutionStatus {
    match raw {
        "Pending"
        | "Waiting"
        | "Scheduled"
        | "PendingApproval"
        | "Approved"
        | "PendingChangeCalendarOverride"
        | "ChangeCalendarOverrideApproved" => ExecutionStatus::Pending,
        "InProgress" | "RunbookInProgress" | "Cancelling" => ExecutionStatus::InProgress,
        "Success" | "CompletedWithSuccess" => ExecutionStatus::Success,
        "Failed"
        | "CompletedWithFailure"
        | "TimedOut"
        | "Rejected"
        | "ChangeCalendarOverrideRejected"
        | "Exited" => ExecutionStatus::Failed,
        "Cancelled" => ExecutionStatus::Cancelled,
        _ => ExecutionStatus::InProgress,
    }
}

/// Map an SSM step status onto [`StepOutcome`].
pub fn map_step_outcome(raw: &str) -> StepOutcome {
    match raw {
        "Success" | "CompletedWithSuccess" => StepOutcome::Success,
        "Failed" | "TimedOut" | "CompletedWithFailure" => StepOutcome::Failed,
        "Cancelled" | "Cancelling" | "Skipped" => StepOutcome::Skipped,
        _ => StepOutcome::Incomplete,
    }
}

fn snapshot_from_execution(execution: &AutomationExecution) -> ExecutionSnapshot {
    ExecutionSnapshot {
        status: execution
            .automation_execution_status()
            .map_or(ExecutionStatus::Pending, |s| map_execution_status(s.as_str())),
        steps: execution.step_executions().iter().map(step_result).collect(),
        failure_message: execution.failure_message().map(str::to_string),
        started_at: execution.execution_start_time().and_then(to_utc),
        finished_at: execution.execution_end_time().and_then(to_utc),
    }
}

fn step_result(step: &StepExecution) -> StepResult {
    StepResult {
        name: step.step_name().unwrap_or_default().to_string(),
        outcome: step
            .step_status()
            .map_or(StepOutcome::Incomplete, |s| map_step_outcome(s.as_str())),
        outputs: step.outputs().map(|outputs| {
            outputs
                .iter()
                .map(|(name, values)| (name.clone(), serde_json::json!(values)))
                .collect::<StepOutputs>()
        }),
        failure_message: step.failure_message().map(str::to_string),
    }
}

fn to_utc(time: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}
