//! Result extraction: terminal execution state to [`DiagnosticReport`].
//!
//! Execution outcome and diagnostic findings are independent: a run that
//! succeeds can still report a misconfigured resource, and that must show
//! up as a finding even though the status is `Success`.

use serde_json::json;

use crate::inspect::Observation;
use crate::report::{DiagnosticReport, Finding, ReportWarning, Severity};
use crate::scenario::Scenario;
use crate::types::{ExecutionSnapshot, ExecutionStatus, StepOutcome, StepOutputs, StepResult};

/// Placeholder output when the report step ran but produced nothing.
pub const NO_OUTPUTS_MESSAGE: &str = "Step executed but no outputs were found";

/// Build the report for a finished (or abandoned) execution.
///
/// Pure: identical inputs always produce an identical report.
pub fn extract(
    scenario: &Scenario,
    execution_id: &str,
    snapshot: &ExecutionSnapshot,
) -> DiagnosticReport {
    let mut warnings = Vec::new();

    let output = match snapshot.status {
        ExecutionStatus::Success => select_report_output(scenario, &snapshot.steps, &mut warnings),
        _ => report_step(scenario, &snapshot.steps).and_then(|s| s.outputs.clone()),
    };

    let Extracted {
        summary,
        findings,
        remediation,
    } = match snapshot.status {
        ExecutionStatus::Success => extract_success(scenario, snapshot),
        ExecutionStatus::Failed => extract_failed(scenario, snapshot, &mut warnings),
        ExecutionStatus::Cancelled | ExecutionStatus::TimedOut => {
            extract_partial(scenario, snapshot)
        }
        status @ (ExecutionStatus::Pending | ExecutionStatus::InProgress) => {
            warnings.push(ReportWarning::ExtractionInconsistent {
                detail: format!("report requested for non-terminal status {status}"),
            });
            extract_partial(scenario, snapshot)
        }
    };

    DiagnosticReport {
        scenario: scenario.name.to_string(),
        workflow: scenario.workflow.to_string(),
        execution_id: execution_id.to_string(),
        status: snapshot.status,
        summary,
        findings,
        remediation,
        steps: snapshot.steps.iter().map(|s| s.name.clone()).collect(),
        output,
        warnings,
        started_at: snapshot.started_at,
        finished_at: snapshot.finished_at,
    }
}

struct Extracted {
    summary: String,
    findings: Vec<Finding>,
    remediation: Vec<String>,
}

// ---------------------------------------------------------------------------
// Per-status rules
// ---------------------------------------------------------------------------

fn extract_success(scenario: &Scenario, snapshot: &ExecutionSnapshot) -> Extracted {
    let mut findings = Vec::new();
    let mut remediation = Vec::new();

    for step in &snapshot.steps {
        if step.outcome == StepOutcome::Failed {
            findings.push(step_failure_finding(step, None, false));
        }
        let observation = observe(scenario, step);
        push_observation(step, &observation, false, &mut findings, &mut remediation);
    }

    let summary = if findings.is_empty() {
        format!(
            "The {} check passed: the runbook completed and reported no issues.",
            scenario.workflow
        )
    } else {
        let issues = findings
            .iter()
            .filter(|f| f.severity >= Severity::Warning)
            .count();
        format!(
            "The {} runbook completed successfully and reported {issues} issue(s) that need attention.",
            scenario.workflow
        )
    };

    Extracted {
        summary,
        findings,
        remediation,
    }
}

fn extract_failed(
    scenario: &Scenario,
    snapshot: &ExecutionSnapshot,
    warnings: &mut Vec<ReportWarning>,
) -> Extracted {
    let mut findings = Vec::new();
    let mut remediation = Vec::new();

    let failed_index = snapshot
        .steps
        .iter()
        .position(|s| s.outcome == StepOutcome::Failed);

    // Steps after the failing one never ran and are left out.
    let considered = match failed_index {
        Some(i) => &snapshot.steps[..=i],
        None => &snapshot.steps[..],
    };

    for step in considered.iter().filter(|s| s.outcome.is_completed()) {
        let observation = observe(scenario, step);
        push_observation(step, &observation, false, &mut findings, &mut remediation);
        if step.outcome == StepOutcome::Failed {
            findings.push(step_failure_finding(
                step,
                snapshot.failure_message.as_deref(),
                false,
            ));
        }
    }

    let summary = match failed_index.map(|i| &snapshot.steps[i]) {
        Some(step) => format!(
            "The {} runbook failed at step '{}': {}",
            scenario.workflow,
            step.name,
            failure_detail(step, snapshot.failure_message.as_deref())
        ),
        None => {
            warnings.push(ReportWarning::ExtractionInconsistent {
                detail: "execution failed but no step reported a failure".to_string(),
            });
            format!(
                "The {} runbook failed: {}",
                scenario.workflow,
                snapshot
                    .failure_message
                    .as_deref()
                    .unwrap_or("no failure detail was reported")
            )
        }
    };

    Extracted {
        summary,
        findings,
        remediation,
    }
}

fn extract_partial(scenario: &Scenario, snapshot: &ExecutionSnapshot) -> Extracted {
    let mut findings = Vec::new();
    let mut remediation = Vec::new();

    for step in snapshot.steps.iter().filter(|s| s.outcome.is_completed()) {
        let observation = observe(scenario, step);
        let before = findings.len();
        push_observation(step, &observation, true, &mut findings, &mut remediation);

        if step.outcome == StepOutcome::Failed {
            findings.push(step_failure_finding(step, None, true));
        } else if findings.len() == before {
            findings.push(Finding {
                step: step.name.clone(),
                severity: Severity::Info,
                message: format!("Step '{}' completed before the run stopped", step.name),
                partial: true,
            });
        }
    }

    let summary = match snapshot.status {
        ExecutionStatus::Cancelled => format!(
            "The {} runbook was cancelled before it completed; findings are partial and the diagnosis is inconclusive.",
            scenario.workflow
        ),
        _ => format!(
            "The {} runbook did not complete in time; findings are partial and the diagnosis is inconclusive.",
            scenario.workflow
        ),
    };

    Extracted {
        summary,
        findings,
        remediation,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn observe(scenario: &Scenario, step: &StepResult) -> Observation {
    match (scenario.inspector, step.outputs.as_ref()) {
        (Some(inspector), Some(outputs)) => inspector.inspect(outputs),
        _ => Observation::default(),
    }
}

fn push_observation(
    step: &StepResult,
    observation: &Observation,
    partial: bool,
    findings: &mut Vec<Finding>,
    remediation: &mut Vec<String>,
) {
    findings.extend(observation.anomalies.iter().map(|a| Finding {
        step: step.name.clone(),
        severity: a.severity,
        message: a.message.clone(),
        partial,
    }));
    for hint in &observation.remediation {
        if !remediation.contains(hint) {
            remediation.push(hint.clone());
        }
    }
}

fn step_failure_finding(step: &StepResult, fallback: Option<&str>, partial: bool) -> Finding {
    Finding {
        step: step.name.clone(),
        severity: Severity::Error,
        message: format!(
            "Step '{}' failed: {}",
            step.name,
            failure_detail(step, fallback)
        ),
        partial,
    }
}

fn failure_detail<'a>(step: &'a StepResult, fallback: Option<&'a str>) -> &'a str {
    step.failure_message
        .as_deref()
        .or(fallback)
        .unwrap_or("no failure detail was reported")
}

fn report_step<'a>(scenario: &Scenario, steps: &'a [StepResult]) -> Option<&'a StepResult> {
    steps.iter().find(|s| s.name == scenario.report_step)
}

/// Pick the outputs that represent the runbook's report.
///
/// Falls back to the last step when the report step is missing, and to a
/// placeholder when the report step has no outputs; both add a warning.
fn select_report_output(
    scenario: &Scenario,
    steps: &[StepResult],
    warnings: &mut Vec<ReportWarning>,
) -> Option<StepOutputs> {
    if let Some(step) = report_step(scenario, steps) {
        return match &step.outputs {
            Some(outputs) => Some(outputs.clone()),
            None => {
                warnings.push(ReportWarning::ExtractionInconsistent {
                    detail: format!("step '{}' found but has no outputs", step.name),
                });
                Some(message_output(NO_OUTPUTS_MESSAGE))
            }
        };
    }

    let Some(last) = steps.last() else {
        warnings.push(ReportWarning::ExtractionInconsistent {
            detail: "no steps found in automation execution result".to_string(),
        });
        return None;
    };

    let detail = format!(
        "Step '{}' not found. Using output from '{}' instead.",
        scenario.report_step, last.name
    );
    warnings.push(ReportWarning::ExtractionInconsistent {
        detail: detail.clone(),
    });
    Some(
        last.outputs
            .clone()
            .unwrap_or_else(|| message_output(&detail)),
    )
}

fn message_output(message: &str) -> StepOutputs {
    let mut outputs = StepOutputs::new();
    outputs.insert("Message".to_string(), json!([message]));
    outputs
}
