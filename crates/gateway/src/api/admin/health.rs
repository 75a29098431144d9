//! Health probe and admin status.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

use super::guard::AdminGuard;

/// `GET /v1/health` — public, no auth.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /v1/admin/status` — admin-guarded. A coarse snapshot for operators:
/// how many clubs loaded, how many senders have an in-memory session.
pub async fn admin_status(_guard: AdminGuard, State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "clubs": state.registry.contexts().count(),
        "sessions": state.sessions.session_count(),
    }))
}
