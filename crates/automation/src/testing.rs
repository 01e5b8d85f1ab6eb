//! Scripted in-memory engine for tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use saw_core::types::{BoundParameters, ExecutionSnapshot, ExecutionStatus};
use tokio::time::Instant;

use crate::engine::{EngineError, WorkflowEngine};

type QueryResult = Result<ExecutionSnapshot, EngineError>;

/// A [`WorkflowEngine`] that replays scripted responses and records calls.
///
/// Status queries consume the scripted responses in order; once only one
/// remains it is returned for every further query.
pub struct ScriptedEngine {
    launch_result: Result<String, EngineError>,
    responses: Mutex<VecDeque<QueryResult>>,
    query_latency: Duration,
    launches: Mutex<Vec<(String, BoundParameters)>>,
    queries: Mutex<Vec<Instant>>,
}

impl ScriptedEngine {
    /// Engine whose launches succeed with `execution_id` and whose
    /// executions stay in progress until responses are scripted.
    pub fn launching(execution_id: &str) -> Self {
        Self {
            launch_result: Ok(execution_id.to_string()),
            responses: Mutex::new(VecDeque::from([Ok(ExecutionSnapshot::new(
                ExecutionStatus::InProgress,
                Vec::new(),
            ))])),
            query_latency: Duration::ZERO,
            launches: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Engine that refuses every launch with `error`.
    pub fn rejecting(error: EngineError) -> Self {
        Self {
            launch_result: Err(error),
            ..Self::launching("unused")
        }
    }

    /// Replace the scripted status query responses.
    pub fn with_responses(self, responses: Vec<QueryResult>) -> Self {
        *lock(&self.responses) = responses.into();
        self
    }

    /// Delay every status query by `latency`.
    pub fn with_query_latency(mut self, latency: Duration) -> Self {
        self.query_latency = latency;
        self
    }

    /// Every `(workflow_id, parameters)` pair passed to `start_execution`.
    pub fn launches(&self) -> Vec<(String, BoundParameters)> {
        lock(&self.launches).clone()
    }

    /// Instants at which status queries were issued.
    pub fn query_times(&self) -> Vec<Instant> {
        lock(&self.queries).clone()
    }

    pub fn query_count(&self) -> usize {
        lock(&self.queries).len()
    }

    fn next_response(&self) -> QueryResult {
        let mut responses = lock(&self.responses);
        if responses.len() > 1 {
            responses
                .pop_front()
                .unwrap_or_else(|| Err(EngineError::Rejected("no scripted response".into())))
        } else {
            responses
                .front()
                .cloned()
                .unwrap_or_else(|| Err(EngineError::Rejected("no scripted response".into())))
        }
    }
}

#[async_trait]
impl WorkflowEngine for ScriptedEngine {
    async fn start_execution(
        &self,
        workflow_id: &str,
        parameters: &BoundParameters,
    ) -> Result<String, EngineError> {
        lock(&self.launches).push((workflow_id.to_string(), parameters.clone()));
        self.launch_result.clone()
    }

    async fn get_execution(&self, _execution_id: &str) -> Result<ExecutionSnapshot, EngineError> {
        lock(&self.queries).push(Instant::now());
        if !self.query_latency.is_zero() {
            tokio::time::sleep(self.query_latency).await;
        }
        self.next_response()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
