//! Execution launcher.

use saw_core::error::TroubleshootError;
use saw_core::types::WorkflowInvocation;

use crate::engine::WorkflowEngine;

/// Start the remote execution for `invocation` and return its handle.
///
/// Every engine failure, throttling included, is surfaced immediately as
/// [`TroubleshootError::LaunchRejected`] carrying the engine's message.
/// Retrying a launch is the caller's decision since each call creates a
/// new execution.
pub async fn launch(
    engine: &dyn WorkflowEngine,
    invocation: &WorkflowInvocation,
) -> Result<String, TroubleshootError> {
    match engine
        .start_execution(invocation.workflow_id(), invocation.parameters())
        .await
    {
        Ok(execution_id) => {
            tracing::info!(
                workflow = invocation.workflow_id(),
                execution_id = %execution_id,
                "Started automation execution",
            );
            Ok(execution_id)
        }
        Err(e) => {
            tracing::error!(
                workflow = invocation.workflow_id(),
                transient = e.is_transient(),
                error = %e,
                "Automation execution launch rejected",
            );
            Err(TroubleshootError::LaunchRejected(e.message().to_string()))
        }
    }
}
