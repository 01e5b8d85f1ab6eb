//! Agents for Amazon Bedrock action-group adapter.
//!
//! The agent calls an action group with an event naming the API path it
//! chose from the schema and the property values it extracted from the
//! conversation. [`handle_event`] resolves the path to a scenario, runs it
//! through the same handler as the HTTP route and wraps the outcome in the
//! response envelope the agent expects.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use saw_core::error::TroubleshootError;
use saw_core::scenario;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult, ValidationDetail};
use crate::handlers::troubleshoot;
use crate::state::AppState;

pub const MESSAGE_VERSION: &str = "1.0";
const JSON_CONTENT: &str = "application/json";

/// Action-group invocation event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEvent {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    #[serde(default)]
    pub parameters: Vec<AgentProperty>,
    #[serde(default)]
    pub request_body: Option<AgentRequestBody>,
    #[serde(default)]
    pub session_attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub prompt_session_attributes: BTreeMap<String, String>,
}

/// A named value the agent extracted, always transported as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentProperty {
    pub name: String,
    /// Schema type of the value (`string`, `integer`, `number`, `boolean`).
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentRequestBody {
    pub content: BTreeMap<String, AgentContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentContent {
    #[serde(default)]
    pub properties: Vec<AgentProperty>,
}

/// Envelope returned to the agent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub message_version: &'static str,
    pub response: ActionResponse,
    pub session_attributes: BTreeMap<String, String>,
    pub prompt_session_attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub http_status_code: u16,
    pub response_body: BTreeMap<String, ResponseContent>,
}

/// Response payload; `body` is the JSON document serialized to a string.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseContent {
    pub body: String,
}

/// POST /bedrock-agent/invoke
pub async fn invoke(
    State(state): State<AppState>,
    event: Result<Json<AgentEvent>, JsonRejection>,
) -> AppResult<Json<AgentResponse>> {
    let Json(event) = event.map_err(|rejection| {
        AppError::Validation(vec![ValidationDetail::json_invalid(rejection.body_text())])
    })?;
    Ok(Json(handle_event(&state, event).await))
}

/// Run the scenario an agent event addresses and build the agent response.
///
/// Errors are not propagated: they are carried in the envelope with the
/// HTTP status the equivalent route would have returned.
pub async fn handle_event(state: &AppState, event: AgentEvent) -> AgentResponse {
    tracing::info!(
        action_group = %event.action_group,
        api_path = %event.api_path,
        http_method = %event.http_method,
        "Bedrock Agent event received",
    );

    let outcome = match scenario::find_by_path(&event.api_path) {
        Some(scenario) => {
            troubleshoot::run_scenario(state, scenario, &event_fields(&event))
                .await
                .and_then(|report| {
                    serde_json::to_value(report)
                        .map_err(|e| AppError::InternalError(e.to_string()))
                })
        }
        None => Err(TroubleshootError::UnknownScenario(event.api_path.clone()).into()),
    };

    let (status, body) = match outcome {
        Ok(report) => (200, report),
        Err(err) => {
            let (status, body) = err.status_and_body();
            (status.as_u16(), body)
        }
    };

    let response_body = BTreeMap::from([(
        JSON_CONTENT.to_string(),
        ResponseContent {
            body: body.to_string(),
        },
    )]);

    AgentResponse {
        message_version: MESSAGE_VERSION,
        response: ActionResponse {
            action_group: event.action_group,
            api_path: event.api_path,
            http_method: event.http_method,
            http_status_code: status,
            response_body,
        },
        session_attributes: event.session_attributes,
        prompt_session_attributes: event.prompt_session_attributes,
    }
}

/// Collect the event's parameters and JSON body properties into one object.
///
/// Body properties win over same-named parameters.
fn event_fields(event: &AgentEvent) -> Map<String, Value> {
    let body_properties = event
        .request_body
        .as_ref()
        .and_then(|body| body.content.get(JSON_CONTENT))
        .map(|content| content.properties.as_slice())
        .unwrap_or_default();

    event
        .parameters
        .iter()
        .chain(body_properties)
        .map(|p| (p.name.clone(), coerce(p)))
        .collect()
}

/// Convert a property's string value to JSON according to its declared type.
///
/// Values that do not parse as their declared type stay strings.
fn coerce(property: &AgentProperty) -> Value {
    let parsed = match property.kind.as_str() {
        "integer" => property.value.parse::<i64>().ok().map(Value::from),
        "number" => property.value.parse::<f64>().ok().map(Value::from),
        "boolean" => property.value.parse::<bool>().ok().map(Value::from),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(property.value.clone()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event(value: Value) -> AgentEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserializes_agent_event() {
        let event = event(json!({
            "messageVersion": "1.0",
            "agent": { "name": "saw-agent", "id": "A1", "alias": "TSTALIASID", "version": "DRAFT" },
            "inputText": "My worker node will not join",
            "sessionId": "s-1",
            "actionGroup": "troubleshooting",
            "apiPath": "/troubleshoot-eks-worker-node",
            "httpMethod": "POST",
            "requestBody": {
                "content": {
                    "application/json": {
                        "properties": [
                            { "name": "cluster_name", "type": "string", "value": "prod" }
                        ]
                    }
                }
            },
            "sessionAttributes": { "user": "ops" }
        }));

        assert_eq!(event.api_path, "/troubleshoot-eks-worker-node");
        assert!(event.parameters.is_empty());
        assert!(event.prompt_session_attributes.is_empty());
        assert_eq!(event.session_attributes["user"], "ops");
        assert_eq!(event_fields(&event)["cluster_name"], json!("prod"));
    }

    #[test]
    fn body_properties_override_parameters() {
        let event = event(json!({
            "actionGroup": "troubleshooting",
            "apiPath": "/troubleshoot-s3-lambda",
            "httpMethod": "POST",
            "parameters": [
                { "name": "s3_bucket_name", "type": "string", "value": "from-parameters" },
                { "name": "region", "type": "string", "value": "us-east-1" }
            ],
            "requestBody": {
                "content": {
                    "application/json": {
                        "properties": [
                            { "name": "s3_bucket_name", "type": "string", "value": "from-body" }
                        ]
                    }
                }
            }
        }));

        let fields = event_fields(&event);
        assert_eq!(fields["s3_bucket_name"], json!("from-body"));
        assert_eq!(fields["region"], json!("us-east-1"));
    }

    #[test]
    fn coerces_declared_types() {
        let prop = |kind: &str, value: &str| AgentProperty {
            name: "x".into(),
            kind: kind.into(),
            value: value.into(),
        };

        assert_eq!(coerce(&prop("integer", "42")), json!(42));
        assert_eq!(coerce(&prop("boolean", "true")), json!(true));
        assert_eq!(coerce(&prop("number", "1.5")), json!(1.5));
        assert_eq!(coerce(&prop("integer", "forty")), json!("forty"));
        assert_eq!(coerce(&prop("string", "7")), json!("7"));
        assert_eq!(coerce(&prop("", "i-0abc")), json!("i-0abc"));
    }
}
