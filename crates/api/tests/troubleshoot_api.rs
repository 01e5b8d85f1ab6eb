//! Integration tests for the per-scenario troubleshooting endpoints.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, post_json, post_raw};
use saw_automation::engine::EngineError;
use saw_automation::testing::ScriptedEngine;
use saw_core::types::{ExecutionSnapshot, ExecutionStatus, StepOutcome, StepResult};
use serde_json::json;

fn eks_body() -> serde_json::Value {
    json!({ "cluster_name": "production-cluster", "worker_id": "i-0abc123def456789" })
}

// ---------------------------------------------------------------------------
// Successful runs
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn eks_success_returns_report() {
    let engine = Arc::new(ScriptedEngine::launching("exec-eks-1").with_responses(vec![
        Ok(ExecutionSnapshot::new(ExecutionStatus::InProgress, Vec::new())),
        Ok(ExecutionSnapshot::new(
            ExecutionStatus::Success,
            vec![
                StepResult::new("GetClusterDetails", StepOutcome::Success),
                StepResult::new("TroubleshootWorkerNode", StepOutcome::Success).with_output(
                    "TroubleshootWorkerNode.Message",
                    json!(["[+] Worker node security groups allow cluster traffic"]),
                ),
            ],
        )),
    ]));
    let app = common::build_test_app(engine.clone());

    let response = post_json(app, "/troubleshoot-eks-worker-node", eks_body()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["scenario"], "eks-worker-node");
    assert_eq!(json["workflow"], "AWSSupport-TroubleshootEKSWorkerNode");
    assert_eq!(json["execution_id"], "exec-eks-1");
    assert_eq!(json["status"], "Success");
    assert_eq!(json["findings"], json!([]));
    assert_eq!(json["steps"], json!(["GetClusterDetails", "TroubleshootWorkerNode"]));
    assert!(json["output"]["TroubleshootWorkerNode.Message"].is_array());
    assert!(json.get("warnings").is_none());

    let launches = engine.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].1["ClusterName"], vec!["production-cluster"]);
}

#[tokio::test(start_paused = true)]
async fn ecs_misconfiguration_is_reported_as_finding() {
    let engine = Arc::new(ScriptedEngine::launching("exec-ecs-1").with_responses(vec![Ok(
        ExecutionSnapshot::new(
            ExecutionStatus::Success,
            vec![StepResult::new("executeChecker", StepOutcome::Success).with_output(
                "executeChecker.Output",
                json!("[FAILED] ECS agent is not running\nRecommendation: start the ecs service"),
            )],
        ),
    )]));
    let app = common::build_test_app(engine.clone());

    let response = post_json(
        app,
        "/troubleshoot-ecs-container-instance",
        json!({ "cluster_name": "web", "container_instance_id": "i-0123456789abcdef0" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "Success");
    assert_eq!(json["findings"][0]["step"], "executeChecker");
    assert_eq!(json["findings"][0]["severity"], "error");
    assert_eq!(json["findings"][0]["partial"], false);
    assert_eq!(
        json["remediation"],
        json!(["Recommendation: start the ecs service"])
    );

    assert_eq!(engine.launches()[0].1["InstanceId"], vec!["i-0123456789abcdef0"]);
}

#[tokio::test(start_paused = true)]
async fn run_past_deadline_returns_timed_out_report() {
    let engine = Arc::new(ScriptedEngine::launching("exec-slow"));
    let app = common::build_test_app(engine.clone());

    let response = post_json(
        app,
        "/troubleshoot-s3-lambda",
        json!({
            "s3_bucket_name": "uploads",
            "lambda_function_arn": "arn:aws:lambda:us-east-1:123456789012:function:resize",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "TimedOut");
    assert_eq!(json["execution_id"], "exec-slow");
    assert!(engine.query_count() > 1);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_fields_return_422_without_launching() {
    let engine = Arc::new(ScriptedEngine::launching("exec-1"));
    let app = common::build_test_app(engine.clone());

    let response = post_json(app, "/troubleshoot-eks-worker-node", json!({ "worker_id": "  " })).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(
        json,
        json!({
            "detail": [
                { "location": ["body", "cluster_name"], "message": "Field required", "type": "missing" },
                { "location": ["body", "worker_id"], "message": "Field required", "type": "missing" }
            ]
        })
    );
    assert!(engine.launches().is_empty());
}

#[tokio::test]
async fn non_string_field_returns_string_type() {
    let engine = Arc::new(ScriptedEngine::launching("exec-1"));
    let app = common::build_test_app(engine);

    let response = post_json(
        app,
        "/troubleshoot-ecs-container-instance",
        json!({ "cluster_name": "web", "container_instance_id": 12345 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["detail"][0]["location"], json!(["body", "container_instance_id"]));
    assert_eq!(json["detail"][0]["type"], "string_type");
}

#[tokio::test]
async fn malformed_body_returns_json_invalid() {
    let engine = Arc::new(ScriptedEngine::launching("exec-1"));
    let app = common::build_test_app(engine);

    let response = post_raw(app, "/troubleshoot-s3-lambda", "{\"s3_bucket_name\": ").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["detail"][0]["type"], "json_invalid");
    assert_eq!(json["detail"][0]["location"], json!(["body"]));
}

// ---------------------------------------------------------------------------
// Engine failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn launch_rejection_returns_502() {
    let engine = Arc::new(ScriptedEngine::rejecting(EngineError::Rejected(
        "Document AWSSupport-TroubleshootEKSWorkerNode not found".into(),
    )));
    let app = common::build_test_app(engine.clone());

    let response = post_json(app, "/troubleshoot-eks-worker-node", eks_body()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "LAUNCH_REJECTED");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Document AWSSupport-TroubleshootEKSWorkerNode not found"));
    assert_eq!(engine.query_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn polling_failure_returns_502() {
    let engine = Arc::new(ScriptedEngine::launching("exec-1").with_responses(vec![Err(
        EngineError::Rejected("User is not authorized to perform ssm:GetAutomationExecution".into()),
    )]));
    let app = common::build_test_app(engine);

    let response = post_json(app, "/troubleshoot-eks-worker-node", eks_body()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "POLLING_FAILED");
}
