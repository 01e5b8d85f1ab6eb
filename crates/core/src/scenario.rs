//! Scenario table: which workflow each troubleshooting use case runs and
//! how caller fields bind to that workflow's parameters.
//!
//! Adding a scenario means adding an entry to [`SCENARIOS`]; the binder,
//! router and HTTP surface all read from this table.

use serde::Serialize;

use crate::inspect::Inspector;

/// Binding of one caller-facing field to a remote workflow parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    /// Caller field name (snake_case).
    pub field: &'static str,
    /// Parameter name the workflow document declares.
    pub parameter: &'static str,
    pub description: &'static str,
}

/// Declarative descriptor for one troubleshooting scenario.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scenario {
    /// Stable scenario identifier used by callers.
    pub name: &'static str,
    /// HTTP path the scenario is exposed on.
    pub path: &'static str,
    pub description: &'static str,
    /// Automation document to execute.
    pub workflow: &'static str,
    /// Step whose outputs carry the runbook's report.
    pub report_step: &'static str,
    /// Required caller fields, in the order they are reported when missing.
    pub fields: &'static [FieldBinding],
    /// Output inspection rules; `None` means only step outcomes are used.
    #[serde(skip)]
    pub inspector: Option<&'static Inspector>,
}

pub const EKS_WORKER_NODE: &str = "eks-worker-node";
pub const ECS_CONTAINER_INSTANCE: &str = "ecs-container-instance";
pub const S3_LAMBDA_EVENT: &str = "s3-lambda-event";

/// Every supported scenario.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: EKS_WORKER_NODE,
        path: "/troubleshoot-eks-worker-node",
        description: "Troubleshoot EKS worker node failed to join the cluster",
        workflow: "AWSSupport-TroubleshootEKSWorkerNode",
        report_step: "TroubleshootWorkerNode",
        fields: &[
            FieldBinding {
                field: "cluster_name",
                parameter: "ClusterName",
                description: "The name of the EKS cluster",
            },
            FieldBinding {
                field: "worker_id",
                parameter: "WorkerID",
                description: "The ID of the worker node",
            },
        ],
        inspector: Some(&crate::inspect::EKS_WORKER_NODE),
    },
    Scenario {
        name: ECS_CONTAINER_INSTANCE,
        path: "/troubleshoot-ecs-container-instance",
        description: "Troubleshoot ECS container instance failed to register with the cluster",
        workflow: "AWSSupport-TroubleshootECSContainerInstance",
        report_step: "executeChecker",
        fields: &[
            FieldBinding {
                field: "cluster_name",
                parameter: "ClusterName",
                description: "The name of the ECS cluster",
            },
            FieldBinding {
                field: "container_instance_id",
                parameter: "InstanceId",
                description: "The ID of the container instance",
            },
        ],
        inspector: Some(&crate::inspect::ECS_CONTAINER_INSTANCE),
    },
    Scenario {
        name: S3_LAMBDA_EVENT,
        path: "/troubleshoot-s3-lambda",
        description: "Troubleshoot why an Amazon S3 event notification failed to trigger the specified AWS Lambda function.",
        workflow: "AWSSupport-TroubleshootLambdaS3Event",
        report_step: "GenerateReport",
        fields: &[
            FieldBinding {
                field: "s3_bucket_name",
                parameter: "S3BucketName",
                description: "The name of the S3 bucket",
            },
            FieldBinding {
                field: "lambda_function_arn",
                parameter: "LambdaFunctionArn",
                description: "The ARN of the Lambda function",
            },
        ],
        inspector: Some(&crate::inspect::S3_LAMBDA_EVENT),
    },
];

/// Look up a scenario by its identifier.
pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

/// Look up a scenario by the HTTP path it is served on.
pub fn find_by_path(path: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.path == path)
}
