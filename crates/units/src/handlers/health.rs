//! Health check endpoint.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health - liveness plus the schemas this deployment can validate against.
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "unitModel": state.unit_model.to_string(),
        "schemas": state.schemas.list_available_schemas(),
    }))
}
