//! Request router: the single entry point for a troubleshooting run.
//!
//! Resolves the scenario, binds parameters, launches the workflow, polls
//! it under the request deadline and extracts the report. Stages run
//! strictly in sequence and any stage failure is returned as is; nothing
//! here retries.

use std::sync::Arc;
use std::time::Duration;

use saw_core::binder;
use saw_core::error::TroubleshootError;
use saw_core::extractor;
use saw_core::report::DiagnosticReport;
use saw_core::scenario;
use saw_core::types::{TroubleshootingRequest, WorkflowInvocation};
use tokio::time::Instant;

use crate::engine::WorkflowEngine;
use crate::launcher;
use crate::poller::{PollConfig, Poller};

/// Runs troubleshooting requests against one workflow engine.
///
/// Holds no per-request state, so a single instance can be shared by
/// concurrent requests.
pub struct Troubleshooter {
    engine: Arc<dyn WorkflowEngine>,
    poll: PollConfig,
    request_budget: Duration,
}

impl Troubleshooter {
    /// * `request_budget` - time allowed per request, from arrival until
    ///   the poller gives up. Must be shorter than the host's own limit.
    pub fn new(engine: Arc<dyn WorkflowEngine>, poll: PollConfig, request_budget: Duration) -> Self {
        Self {
            engine,
            poll,
            request_budget,
        }
    }

    pub fn request_budget(&self) -> Duration {
        self.request_budget
    }

    /// Run a request with a deadline of now plus the request budget.
    pub async fn run(
        &self,
        request: &TroubleshootingRequest,
    ) -> Result<DiagnosticReport, TroubleshootError> {
        self.run_until(request, Instant::now() + self.request_budget)
            .await
    }

    /// Run a request that must finish polling by `deadline`.
    pub async fn run_until(
        &self,
        request: &TroubleshootingRequest,
        deadline: Instant,
    ) -> Result<DiagnosticReport, TroubleshootError> {
        let scenario = scenario::find(&request.scenario)
            .ok_or_else(|| TroubleshootError::UnknownScenario(request.scenario.clone()))?;

        tracing::info!(
            scenario = scenario.name,
            workflow = scenario.workflow,
            "Troubleshooting request received",
        );

        let parameters = binder::bind(scenario, &request.parameters)?;
        let invocation = WorkflowInvocation::new(scenario.workflow, parameters);

        let execution_id = launcher::launch(self.engine.as_ref(), &invocation).await?;
        let invocation = invocation.launched(execution_id.as_str());

        let snapshot = Poller::new(self.engine.as_ref(), &self.poll)
            .poll(&execution_id, deadline)
            .await?;

        let report = extractor::extract(scenario, &execution_id, &snapshot);
        tracing::info!(
            scenario = scenario.name,
            execution_id = invocation.execution_id().unwrap_or_default(),
            status = %report.status,
            findings = report.findings.len(),
            has_issues = report.has_issues(),
            warnings = report.warnings.len(),
            "Diagnostic report assembled",
        );
        tracing::debug!(output = ?report.output, "Report step output");

        Ok(report)
    }
}
