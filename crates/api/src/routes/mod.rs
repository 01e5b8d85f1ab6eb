pub mod health;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use saw_core::scenario::SCENARIOS;

use crate::bedrock;
use crate::handlers::{scenarios, troubleshoot};
use crate::state::AppState;

/// Build the API route tree.
///
/// Scenario routes are mounted at the root because the Bedrock Agent's
/// `apiPath` uses the same paths.
///
/// ```text
/// POST /troubleshoot-eks-worker-node          EKS worker node join failure
/// POST /troubleshoot-ecs-container-instance   ECS container instance registration
/// POST /troubleshoot-s3-lambda                S3 event notification to Lambda
///
/// GET  /scenarios                             scenario catalogue
/// POST /bedrock-agent/invoke                  Bedrock Agent action-group event
/// ```
pub fn api_routes() -> Router<AppState> {
    let router = SCENARIOS.iter().fold(Router::<AppState>::new(), |router, scenario| {
        router.route(
            scenario.path,
            post(move |state: State<AppState>, body: Bytes| {
                troubleshoot::troubleshoot(scenario, state, body)
            }),
        )
    });

    router
        .route("/scenarios", get(scenarios::list_scenarios))
        .route("/bedrock-agent/invoke", post(bedrock::invoke))
}
