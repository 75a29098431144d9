//! `POST /v1/inbound` — the one endpoint the messaging provider calls for
//! every inbound chat message (A4/C6).

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::runtime::handle_inbound;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InboundRequest {
    pub sender_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct InboundResponse {
    pub accepted: bool,
}

pub async fn inbound(State(state): State<AppState>, Json(req): Json<InboundRequest>) -> impl IntoResponse {
    let accepted = handle_inbound(&state, &req.sender_id, &req.text).await;
    Json(InboundResponse { accepted })
}
