//! Handlers for the per-scenario troubleshooting endpoints.
//!
//! Every scenario shares one handler; the route table closes over the
//! scenario descriptor. Bodies are read as raw bytes so that every field
//! problem can be reported in a single 422 response instead of stopping at
//! the first deserialization error.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use saw_core::binder;
use saw_core::report::DiagnosticReport;
use saw_core::scenario::Scenario;
use saw_core::types::TroubleshootingRequest;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult, ValidationDetail};
use crate::state::AppState;

/// POST /troubleshoot-*
///
/// Run the scenario against the caller's JSON body and return the
/// diagnostic report. A run that hits the deadline still returns 200 with
/// status `TimedOut`.
pub async fn troubleshoot(
    scenario: &'static Scenario,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<DiagnosticReport>> {
    let fields = parse_object(&body)?;
    run_scenario(&state, scenario, &fields).await.map(Json)
}

/// Validate `fields` for `scenario` and run it to a report.
///
/// Shared with the Bedrock Agent adapter.
pub async fn run_scenario(
    state: &AppState,
    scenario: &'static Scenario,
    fields: &Map<String, Value>,
) -> AppResult<DiagnosticReport> {
    let request = request_from_fields(scenario, fields)?;
    let report = state.troubleshooter.run(&request).await?;
    Ok(report)
}

/// Decode a request body that must be a JSON object.
pub fn parse_object(body: &[u8]) -> AppResult<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Validation(vec![ValidationDetail::json_invalid(
            "Input should be a valid JSON object",
        )])),
        Err(e) => Err(AppError::Validation(vec![ValidationDetail::json_invalid(
            format!("JSON decode error: {e}"),
        )])),
    }
}

/// Build a [`TroubleshootingRequest`] from a JSON object, reporting every
/// missing, blank or non-string required field at once.
///
/// Fields the scenario does not declare are ignored.
pub fn request_from_fields(
    scenario: &'static Scenario,
    fields: &Map<String, Value>,
) -> AppResult<TroubleshootingRequest> {
    let mut parameters = BTreeMap::new();
    let mut wrong_type = Vec::new();

    for binding in scenario.fields {
        match fields.get(binding.field) {
            Some(Value::String(value)) => {
                parameters.insert(binding.field.to_string(), value.clone());
            }
            None | Some(Value::Null) => {}
            Some(_) => wrong_type.push(binding.field),
        }
    }

    let missing = binder::missing_fields(scenario, &parameters);
    let details: Vec<ValidationDetail> = scenario
        .fields
        .iter()
        .filter_map(|binding| {
            if wrong_type.contains(&binding.field) {
                Some(ValidationDetail::string_type(binding.field))
            } else if missing.contains(&binding.field) {
                Some(ValidationDetail::missing(binding.field))
            } else {
                None
            }
        })
        .collect();

    if !details.is_empty() {
        return Err(AppError::Validation(details));
    }

    Ok(TroubleshootingRequest {
        scenario: scenario.name.to_string(),
        parameters,
    })
}
