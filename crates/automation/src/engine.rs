//! Seam between the orchestrator and the remote automation engine.

use async_trait::async_trait;
use saw_core::types::{BoundParameters, ExecutionSnapshot};

/// Errors from the remote engine, already classified for retry purposes.
///
/// Raw SDK errors never cross this seam; only their sanitized message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Rate limiting, timeouts and network faults. Worth retrying.
    #[error("Transient engine error: {0}")]
    Transient(String),

    /// Anything the engine refused outright (unknown document, bad
    /// parameters, access denied).
    #[error("Engine rejected the request: {0}")]
    Rejected(String),
}

impl EngineError {
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Transient(_))
    }

    /// The engine's message without the classification prefix.
    pub fn message(&self) -> &str {
        match self {
            EngineError::Transient(msg) | EngineError::Rejected(msg) => msg,
        }
    }
}

/// Remote workflow engine operations the orchestrator depends on.
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Start one execution of `workflow_id`. Not idempotent: every call
    /// creates a new execution.
    async fn start_execution(
        &self,
        workflow_id: &str,
        parameters: &BoundParameters,
    ) -> Result<String, EngineError>;

    /// Fetch the current status and step results of an execution.
    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionSnapshot, EngineError>;
}
