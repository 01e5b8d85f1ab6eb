//! Shared response envelope for listing endpoints.
//!
//! Troubleshooting endpoints return the report object itself, since the
//! agent consumes it directly; catalogue-style endpoints wrap their payload
//! in `{ "data": ... }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
