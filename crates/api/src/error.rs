use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saw_core::error::TroubleshootError;
use serde::Serialize;
use serde_json::json;

/// One field-level validation problem, reported in a 422 `detail` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetail {
    /// Path to the offending value, e.g. `["body", "cluster_name"]`.
    pub location: Vec<String>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationDetail {
    /// A required body field that is absent, null or blank.
    pub fn missing(field: &str) -> Self {
        Self {
            location: vec!["body".to_string(), field.to_string()],
            message: "Field required".to_string(),
            kind: "missing".to_string(),
        }
    }

    /// A body field that is present but not a string.
    pub fn string_type(field: &str) -> Self {
        Self {
            location: vec!["body".to_string(), field.to_string()],
            message: "Input should be a valid string".to_string(),
            kind: "string_type".to_string(),
        }
    }

    /// The request body itself could not be used.
    pub fn json_invalid(message: impl Into<String>) -> Self {
        Self {
            location: vec!["body".to_string()],
            message: message.into(),
            kind: "json_invalid".to_string(),
        }
    }
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`TroubleshootError`] for orchestration failures and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure from the troubleshooting pipeline.
    #[error(transparent)]
    Troubleshoot(#[from] TroubleshootError),

    /// Field-level request validation failures (422).
    #[error("Request validation failed")]
    Validation(Vec<ValidationDetail>),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status and JSON body for this error.
    ///
    /// Shared by [`IntoResponse`] and the Bedrock Agent adapter, which
    /// needs the body as a value rather than a response.
    pub fn status_and_body(&self) -> (StatusCode, serde_json::Value) {
        let (status, code, message) = match self {
            AppError::Validation(details) => {
                return (StatusCode::UNPROCESSABLE_ENTITY, json!({ "detail": details }));
            }

            // --- TroubleshootError variants ---
            AppError::Troubleshoot(err) => match err {
                TroubleshootError::MissingParameter(field) => {
                    let details = [ValidationDetail::missing(field)];
                    return (StatusCode::UNPROCESSABLE_ENTITY, json!({ "detail": details }));
                }
                TroubleshootError::UnknownScenario(_) => {
                    (StatusCode::NOT_FOUND, err.code(), err.to_string())
                }
                TroubleshootError::LaunchRejected(_) | TroubleshootError::PollingFailed { .. } => {
                    tracing::warn!(error = %err, "Automation request failed");
                    (StatusCode::BAD_GATEWAY, err.code(), err.to_string())
                }
            },

            // --- HTTP-specific errors ---
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, json!({ "error": message, "code": code }))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, axum::Json(body)).into_response()
    }
}
