pub mod admin;
pub mod inbound;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router: the inbound webhook and health are public;
/// admin status is gated behind `AdminGuard` inside the handler's state.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/inbound", post(inbound::inbound))
        .route("/v1/health", get(admin::health))
        .route("/v1/admin/status", get(admin::admin_status))
        .with_state(state)
}
