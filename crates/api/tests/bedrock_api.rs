//! Integration tests for the Bedrock Agent action-group endpoint.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, post_json, post_raw};
use saw_automation::testing::ScriptedEngine;
use saw_core::types::{ExecutionSnapshot, ExecutionStatus, StepOutcome, StepResult};
use serde_json::{json, Value};

fn agent_event(api_path: &str, properties: Value) -> Value {
    json!({
        "messageVersion": "1.0",
        "actionGroup": "saw-troubleshooting",
        "apiPath": api_path,
        "httpMethod": "POST",
        "sessionId": "session-1",
        "inputText": "Why is my Lambda not triggered by S3?",
        "requestBody": {
            "content": {
                "application/json": { "properties": properties }
            }
        },
        "sessionAttributes": { "team": "platform" },
        "promptSessionAttributes": { "region": "us-east-1" }
    })
}

/// Parse the string-encoded body inside an agent response envelope.
fn inner_body(envelope: &Value) -> Value {
    let body = envelope["response"]["responseBody"]["application/json"]["body"]
        .as_str()
        .unwrap();
    serde_json::from_str(body).unwrap()
}

#[tokio::test(start_paused = true)]
async fn agent_event_runs_scenario_and_wraps_report() {
    let engine = Arc::new(ScriptedEngine::launching("exec-s3-1").with_responses(vec![Ok(
        ExecutionSnapshot::new(
            ExecutionStatus::Success,
            vec![StepResult::new("GenerateReport", StepOutcome::Success).with_output(
                "GenerateReport.Report",
                json!("[ERROR] Bucket notification does not target the function"),
            )],
        ),
    )]));
    let app = common::build_test_app(engine.clone());

    let event = agent_event(
        "/troubleshoot-s3-lambda",
        json!([
            { "name": "s3_bucket_name", "type": "string", "value": "uploads" },
            { "name": "lambda_function_arn", "type": "string", "value": "arn:aws:lambda:us-east-1:123456789012:function:resize" }
        ]),
    );
    let response = post_json(app, "/bedrock-agent/invoke", event).await;

    assert_eq!(response.status(), StatusCode::OK);
    let envelope = body_json(response).await;
    assert_eq!(envelope["messageVersion"], "1.0");
    assert_eq!(envelope["response"]["actionGroup"], "saw-troubleshooting");
    assert_eq!(envelope["response"]["apiPath"], "/troubleshoot-s3-lambda");
    assert_eq!(envelope["response"]["httpMethod"], "POST");
    assert_eq!(envelope["response"]["httpStatusCode"], 200);
    assert_eq!(envelope["sessionAttributes"], json!({ "team": "platform" }));
    assert_eq!(envelope["promptSessionAttributes"], json!({ "region": "us-east-1" }));

    let report = inner_body(&envelope);
    assert_eq!(report["execution_id"], "exec-s3-1");
    assert_eq!(report["findings"][0]["severity"], "error");

    assert_eq!(engine.launches()[0].0, "AWSSupport-TroubleshootLambdaS3Event");
    assert_eq!(engine.launches()[0].1["S3BucketName"], vec!["uploads"]);
}

#[tokio::test]
async fn agent_event_with_missing_property_carries_422() {
    let engine = Arc::new(ScriptedEngine::launching("exec-1"));
    let app = common::build_test_app(engine.clone());

    let event = agent_event(
        "/troubleshoot-eks-worker-node",
        json!([{ "name": "cluster_name", "type": "string", "value": "prod" }]),
    );
    let response = post_json(app, "/bedrock-agent/invoke", event).await;

    assert_eq!(response.status(), StatusCode::OK);
    let envelope = body_json(response).await;
    assert_eq!(envelope["response"]["httpStatusCode"], 422);
    let body = inner_body(&envelope);
    assert_eq!(body["detail"][0]["location"], json!(["body", "worker_id"]));
    assert!(engine.launches().is_empty());
}

#[tokio::test]
async fn agent_event_for_unknown_path_carries_404() {
    let engine = Arc::new(ScriptedEngine::launching("exec-1"));
    let app = common::build_test_app(engine);

    let event = agent_event("/troubleshoot-rds-connectivity", json!([]));
    let response = post_json(app, "/bedrock-agent/invoke", event).await;

    let envelope = body_json(response).await;
    assert_eq!(envelope["response"]["httpStatusCode"], 404);
    assert_eq!(inner_body(&envelope)["code"], "UNKNOWN_SCENARIO");
}

#[tokio::test]
async fn malformed_agent_event_returns_422() {
    let engine = Arc::new(ScriptedEngine::launching("exec-1"));
    let app = common::build_test_app(engine);

    let response = post_raw(app, "/bedrock-agent/invoke", "{\"actionGroup\": \"x\"}").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["detail"][0]["type"], "json_invalid");
}
