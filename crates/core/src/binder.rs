//! Parameter binding: caller fields to workflow parameters.

use std::collections::BTreeMap;

use crate::error::TroubleshootError;
use crate::scenario::Scenario;
use crate::types::BoundParameters;

/// Bind caller parameters to the scenario's workflow parameters.
///
/// Fails on the first required field (in table order) that is absent or
/// blank after trimming. Values are passed through unchanged, each
/// wrapped into a single-element list. Unknown caller fields are ignored.
pub fn bind(
    scenario: &Scenario,
    raw: &BTreeMap<String, String>,
) -> Result<BoundParameters, TroubleshootError> {
    let mut bound = BoundParameters::new();

    for binding in scenario.fields {
        let value = raw
            .get(binding.field)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TroubleshootError::MissingParameter(binding.field.to_string()))?;
        bound.insert(binding.parameter.to_string(), vec![value.clone()]);
    }

    Ok(bound)
}

/// Every required field that is absent or blank, in table order.
///
/// Used by the HTTP layer to report all offending fields at once.
pub fn missing_fields(scenario: &Scenario, raw: &BTreeMap<String, String>) -> Vec<&'static str> {
    scenario
        .fields
        .iter()
        .filter(|b| raw.get(b.field).map_or(true, |v| v.trim().is_empty()))
        .map(|b| b.field)
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::scenario::{self, ECS_CONTAINER_INSTANCE, EKS_WORKER_NODE, S3_LAMBDA_EVENT};

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn binds_eks_fields_to_workflow_parameters() {
        let eks = scenario::find(EKS_WORKER_NODE).unwrap();
        let bound = bind(
            eks,
            &params(&[
                ("cluster_name", "production-cluster"),
                ("worker_id", "i-0abc123def456789"),
            ]),
        )
        .unwrap();

        assert_eq!(bound.len(), 2);
        assert_eq!(bound["ClusterName"], vec!["production-cluster"]);
        assert_eq!(bound["WorkerID"], vec!["i-0abc123def456789"]);
    }

    #[test]
    fn binds_ecs_and_s3_parameter_names() {
        let ecs = scenario::find(ECS_CONTAINER_INSTANCE).unwrap();
        let bound = bind(
            ecs,
            &params(&[("cluster_name", "c"), ("container_instance_id", "i-1")]),
        )
        .unwrap();
        assert_eq!(bound["InstanceId"], vec!["i-1"]);

        let s3 = scenario::find(S3_LAMBDA_EVENT).unwrap();
        let bound = bind(
            s3,
            &params(&[
                ("s3_bucket_name", "uploads"),
                ("lambda_function_arn", "arn:aws:lambda:us-east-1:123456789012:function:f"),
            ]),
        )
        .unwrap();
        assert_eq!(bound["S3BucketName"], vec!["uploads"]);
        assert!(bound.contains_key("LambdaFunctionArn"));
    }

    #[test]
    fn missing_field_is_named() {
        let eks = scenario::find(EKS_WORKER_NODE).unwrap();
        let err = bind(eks, &params(&[("cluster_name", "prod")])).unwrap_err();
        assert_matches!(err, TroubleshootError::MissingParameter(ref f) if f == "worker_id");
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let eks = scenario::find(EKS_WORKER_NODE).unwrap();
        let err = bind(eks, &params(&[("cluster_name", "   "), ("worker_id", "i-1")])).unwrap_err();
        assert_eq!(err, TroubleshootError::MissingParameter("cluster_name".into()));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let eks = scenario::find(EKS_WORKER_NODE).unwrap();
        let bound = bind(
            eks,
            &params(&[("cluster_name", "c"), ("worker_id", "w"), ("region", "eu-west-1")]),
        )
        .unwrap();
        assert_eq!(bound.len(), 2);
    }

    #[test]
    fn lists_all_missing_fields() {
        let eks = scenario::find(EKS_WORKER_NODE).unwrap();
        assert_eq!(
            missing_fields(eks, &params(&[("worker_id", "")])),
            vec!["cluster_name", "worker_id"]
        );
        assert!(missing_fields(eks, &params(&[("cluster_name", "c"), ("worker_id", "w")])).is_empty());
    }
}
