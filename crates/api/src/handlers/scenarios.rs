use axum::response::IntoResponse;
use axum::Json;
use saw_core::scenario::SCENARIOS;

use crate::response::DataResponse;

/// GET /scenarios
///
/// List every supported scenario with its path, workflow and caller fields.
pub async fn list_scenarios() -> impl IntoResponse {
    Json(DataResponse { data: SCENARIOS })
}
