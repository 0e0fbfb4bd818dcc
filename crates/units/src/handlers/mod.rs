pub mod dynamic;
pub mod error;
pub mod events;
pub mod fixed;
pub mod health;

use crate::appsync::{codes, AppSyncEvent, Response};
use crate::config::UnitModel;
use crate::state::AppState;

/// Resolves one gateway event. Never fails: every outcome is an envelope.
pub async fn handle_event(state: &AppState, event: &AppSyncEvent) -> Response {
    log_event(event);

    let operation = event.operation_type();
    tracing::info!(
        operation = %operation,
        field_name = %event.field_name,
        unit_model = %state.unit_model,
        "Processing operation"
    );

    match state.unit_model {
        UnitModel::Dynamic => dynamic::handle(state, operation, event).await,
        UnitModel::Fixed => fixed::handle(state, operation, event).await,
    }
}

/// Resolves a raw event payload, reporting undecodable payloads as `PARSE_ERROR`.
pub async fn handle_raw_event(state: &AppState, payload: &[u8]) -> Response {
    match serde_json::from_slice::<AppSyncEvent>(payload) {
        Ok(event) => handle_event(state, &event).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse event");
            Response::error(codes::PARSE_ERROR, "Failed to parse event", Some(e.to_string()))
        }
    }
}

pub(crate) fn unknown_operation(event: &AppSyncEvent) -> Response {
    tracing::warn!(field_name = %event.field_name, "Unknown operation");
    Response::error(
        codes::UNKNOWN_OPERATION,
        format!("Unknown operation: {}", event.field_name),
        None,
    )
}

/// Debug dump of the incoming event, one entry per section.
fn log_event(event: &AppSyncEvent) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    tracing::debug!(
        type_name = %event.type_name,
        field_name = %event.field_name,
        operation = %event.operation_type(),
        "Event received"
    );
    tracing::debug!(arguments = %event.arguments, "Event arguments");

    let identity = &event.identity;
    tracing::debug!(
        sub = %identity.sub,
        username = %identity.username,
        account_id = %identity.account_id,
        source_ip = ?identity.source_ip,
        "Event identity"
    );
    tracing::debug!(headers = ?event.request.headers, "Event headers");
    tracing::debug!(
        field_name = %event.info.field_name,
        parent_type_name = %event.info.parent_type_name,
        variables = ?event.info.variables,
        "Event info"
    );
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_operation() {
        let state = AppState::in_memory(UnitModel::Dynamic);
        let event = AppSyncEvent {
            field_name: "archiveUnit".to_string(),
            ..AppSyncEvent::default()
        };

        let response = handle_event(&state, &event).await;
        assert!(!response.success);
        let info = response.error.unwrap();
        assert_eq!(info.code, "UNKNOWN_OPERATION");
        assert_eq!(info.message, "Unknown operation: archiveUnit");
    }

    #[tokio::test]
    async fn test_raw_event_parse_error() {
        let state = AppState::in_memory(UnitModel::Fixed);

        let response = handle_raw_event(&state, b"{not json").await;
        let info = response.error.unwrap();
        assert_eq!(info.code, "PARSE_ERROR");
        assert_eq!(info.message, "Failed to parse event");
        assert!(info.details.is_some());
    }

    #[tokio::test]
    async fn test_raw_event_routes_by_unit_model() {
        let state = AppState::in_memory(UnitModel::Fixed);
        let payload = br#"{"fieldName":"getUnitsById","arguments":{"input":{"id":"abc"}}}"#;

        let response = handle_raw_event(&state, payload).await;
        assert!(response.success, "{response:?}");
        assert_eq!(response.message.as_deref(), Some("Retrieved 0 units"));
    }
}
