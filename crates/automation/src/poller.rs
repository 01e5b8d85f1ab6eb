//! Execution poller.
//!
//! Queries an execution until it reaches a terminal status or the
//! caller's deadline passes. The wait between queries starts at
//! [`PollConfig::initial_interval`] and grows geometrically up to
//! [`PollConfig::max_interval`]. A status query that fails transiently is
//! retried on the same backoff, up to [`PollConfig::max_query_retries`]
//! times, before polling gives up.
//!
//! The poller never cancels the remote execution; when the deadline
//! passes it simply stops looking and reports `TimedOut`.

use std::time::Duration;

use saw_core::error::TroubleshootError;
use saw_core::types::{ExecutionSnapshot, ExecutionStatus};
use tokio::time::Instant;

use crate::engine::{EngineError, WorkflowEngine};

/// Tunable parameters for the polling backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Wait before the second status query.
    pub initial_interval: Duration,
    /// Upper bound on the wait between queries.
    pub max_interval: Duration,
    /// Factor by which the wait grows after each query.
    pub multiplier: f64,
    /// Transient failures tolerated per individual status query.
    pub max_query_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            max_query_retries: 3,
        }
    }
}

/// Calculate the next wait from the current one.
///
/// Never shrinks, and is clamped to [`PollConfig::max_interval`].
pub fn next_interval(current: Duration, config: &PollConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier.max(1.0)) as u64;
    Duration::from_millis(next_ms)
        .max(current)
        .min(config.max_interval)
}

/// Polls one execution against a remote engine.
pub struct Poller<'a> {
    engine: &'a dyn WorkflowEngine,
    config: &'a PollConfig,
}

impl<'a> Poller<'a> {
    pub fn new(engine: &'a dyn WorkflowEngine, config: &'a PollConfig) -> Self {
        Self { engine, config }
    }

    /// Poll `execution_id` until it is terminal or `deadline` passes.
    ///
    /// Returns the terminal snapshot, or a `TimedOut` snapshot carrying the
    /// steps seen so far. Fails with [`TroubleshootError::PollingFailed`]
    /// when a status query fails hard before a terminal status is seen.
    /// Returns no later than `deadline`.
    pub async fn poll(
        &self,
        execution_id: &str,
        deadline: Instant,
    ) -> Result<ExecutionSnapshot, TroubleshootError> {
        let mut interval = self.config.initial_interval;
        let mut last = ExecutionSnapshot::new(ExecutionStatus::Pending, Vec::new());
        let mut attempt = 0u32;

        loop {
            if Instant::now() >= deadline {
                return Ok(self.timed_out(execution_id, last, attempt));
            }

            attempt += 1;
            match self.query(execution_id, deadline, &mut interval).await {
                Ok(Some(snapshot)) if snapshot.status.is_terminal() => {
                    tracing::info!(
                        execution_id,
                        attempt,
                        status = %snapshot.status,
                        steps = snapshot.steps.len(),
                        "Automation execution reached terminal status",
                    );
                    return Ok(snapshot);
                }
                Ok(Some(snapshot)) => last = snapshot,
                Ok(None) => return Ok(self.timed_out(execution_id, last, attempt)),
                Err(e) => {
                    tracing::error!(
                        execution_id,
                        attempt,
                        last_known = %last.status,
                        error = %e,
                        "Polling automation execution failed",
                    );
                    return Err(TroubleshootError::PollingFailed {
                        last_known: last.status,
                        reason: e.message().to_string(),
                    });
                }
            }

            let wake = (Instant::now() + interval).min(deadline);
            tracing::debug!(
                execution_id,
                attempt,
                status = %last.status,
                delay_ms = interval.as_millis() as u64,
                "Automation execution still running",
            );
            tokio::time::sleep_until(wake).await;
            interval = next_interval(interval, self.config);
        }
    }

    /// One status query, retrying transient failures.
    ///
    /// Retries wait on the poll loop's own `interval` and advance it, so a
    /// retry never comes sooner than the next regular query would.
    /// `Ok(None)` means the deadline passed before an answer arrived.
    async fn query(
        &self,
        execution_id: &str,
        deadline: Instant,
        interval: &mut Duration,
    ) -> Result<Option<ExecutionSnapshot>, EngineError> {
        let mut retries = 0u32;

        loop {
            let result =
                match tokio::time::timeout_at(deadline, self.engine.get_execution(execution_id))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => return Ok(None),
                };

            match result {
                Ok(snapshot) => return Ok(Some(snapshot)),
                Err(e) if e.is_transient() && retries < self.config.max_query_retries => {
                    retries += 1;
                    tracing::warn!(
                        execution_id,
                        retry = retries,
                        max_retries = self.config.max_query_retries,
                        delay_ms = interval.as_millis() as u64,
                        error = %e,
                        "Transient status query failure, retrying",
                    );
                    tokio::time::sleep_until((Instant::now() + *interval).min(deadline)).await;
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    *interval = next_interval(*interval, self.config);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn timed_out(&self, execution_id: &str, last: ExecutionSnapshot, attempt: u32) -> ExecutionSnapshot {
        tracing::warn!(
            execution_id,
            attempt,
            last_known = %last.status,
            "Deadline reached before automation execution finished; it keeps running remotely",
        );
        ExecutionSnapshot {
            status: ExecutionStatus::TimedOut,
            finished_at: None,
            ..last
        }
    }
}
