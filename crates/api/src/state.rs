use std::sync::Arc;

use saw_automation::troubleshooter::Troubleshooter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the troubleshooter holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub troubleshooter: Arc<Troubleshooter>,
}
