//! HTTP entry point for gateway events.

use axum::{body::Bytes, extract::State, Json};

use crate::{appsync::Response, state::AppState};

/// POST /events - resolves one gateway event.
///
/// Always answers 200; failures are reported inside the envelope.
#[axum::debug_handler]
pub async fn resolve_event(State(state): State<AppState>, body: Bytes) -> Json<Response> {
    Json(super::handle_raw_event(&state, &body).await)
}
