//! Resolvers for schema-validated units.
//!
//! The sort key discriminator is the unit type, and `data` is checked against the
//! unit type's JSON schema on every write.

use serde_json::json;

use units_core::unit::{DynamicUnit, UnitRecord};

use super::error::{invalid_input, repository_failure, require_fields};
use crate::appsync::{
    codes, AppSyncEvent, CreateUnitInput, ListUnitsInput, OperationType, Response, UnitKeyInput,
    UpdateUnitInput,
};
use crate::state::AppState;

pub async fn handle(state: &AppState, operation: OperationType, event: &AppSyncEvent) -> Response {
    match operation {
        OperationType::Create => create_unit(state, event).await,
        OperationType::Read => get_unit(state, event).await,
        OperationType::Update => update_unit(state, event).await,
        OperationType::Delete => delete_unit(state, event).await,
        OperationType::List => list_units(state, event).await,
        OperationType::LookupById | OperationType::Unknown => super::unknown_operation(event),
    }
}

fn unsupported_unit_type(state: &AppState, unit_type: &str) -> Option<Response> {
    if state.schemas.is_supported(unit_type) {
        return None;
    }
    tracing::warn!(unit_type, "Invalid unit type");
    Some(Response::error(
        codes::VALIDATION_ERROR,
        "Invalid unit type",
        Some(format!("unsupported unit type: {unit_type}")),
    ))
}

/// createUnit
async fn create_unit(state: &AppState, event: &AppSyncEvent) -> Response {
    let input: CreateUnitInput = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[
        (&input.account_id, "AccountID is required"),
        (&input.unit_type, "UnitType is required"),
    ]) {
        return response;
    }
    if let Some(response) = unsupported_unit_type(state, &input.unit_type) {
        return response;
    }

    let mut unit = DynamicUnit::new(input.unit_type)
        .with_account_id(input.account_id)
        .with_data(input.data);

    match state.dynamic_units.create(&mut unit).await {
        Ok(()) => {
            tracing::info!(id = %unit.id, account_id = %unit.account_id, unit_type = %unit.unit_type, "Unit created");
            Response::success(unit.to_document(), "Unit created successfully")
        }
        Err(e) => repository_failure(&e, codes::CREATE_FAILED, "Failed to create unit"),
    }
}

/// getUnit
async fn get_unit(state: &AppState, event: &AppSyncEvent) -> Response {
    let input: UnitKeyInput = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[
        (&input.id, "ID is required"),
        (&input.account_id, "AccountID is required"),
        (&input.unit_type, "UnitType is required"),
    ]) {
        return response;
    }

    match state
        .dynamic_units
        .get_by_id(&input.account_id, &input.unit_type, &input.id)
        .await
    {
        Ok(Some(unit)) => Response::success(unit.to_document(), "Unit retrieved successfully"),
        Ok(None) => Response::error(codes::NOT_FOUND, "Unit not found", None),
        Err(e) => repository_failure(&e, codes::READ_FAILED, "Failed to retrieve unit"),
    }
}

/// updateUnit: merges the `data` delta over the stored payload.
async fn update_unit(state: &AppState, event: &AppSyncEvent) -> Response {
    let input: UpdateUnitInput = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[
        (&input.id, "ID is required"),
        (&input.account_id, "AccountID is required"),
        (&input.unit_type, "UnitType is required"),
    ]) {
        return response;
    }
    if let Some(response) = unsupported_unit_type(state, &input.unit_type) {
        return response;
    }

    let existing = state
        .dynamic_units
        .get_by_id(&input.account_id, &input.unit_type, &input.id)
        .await;
    let mut unit = match existing {
        Ok(Some(unit)) => unit,
        Ok(None) => return Response::error(codes::NOT_FOUND, "Unit not found", None),
        Err(e) => {
            return repository_failure(
                &e,
                codes::UPDATE_FAILED,
                "Failed to verify unit existence",
            )
        }
    };

    unit.merge_data(input.data);
    match state.dynamic_units.update(&mut unit).await {
        Ok(()) => {
            tracing::info!(id = %unit.id, account_id = %unit.account_id, "Unit updated");
            Response::success(unit.to_document(), "Unit updated successfully")
        }
        Err(e) => repository_failure(&e, codes::UPDATE_FAILED, "Failed to update unit"),
    }
}

/// deleteUnit
async fn delete_unit(state: &AppState, event: &AppSyncEvent) -> Response {
    let input: UnitKeyInput = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[
        (&input.id, "ID is required"),
        (&input.account_id, "AccountID is required"),
        (&input.unit_type, "UnitType is required"),
    ]) {
        return response;
    }

    match state
        .dynamic_units
        .delete(&input.account_id, &input.unit_type, &input.id)
        .await
    {
        Ok(()) => {
            tracing::info!(id = %input.id, account_id = %input.account_id, "Unit deleted");
            Response::success(
                json!({
                    "id": input.id,
                    "accountId": input.account_id,
                    "unitType": input.unit_type,
                    "deleted": true,
                }),
                "Unit deleted successfully",
            )
        }
        Err(e) => repository_failure(&e, codes::DELETE_FAILED, "Failed to delete unit"),
    }
}

/// listUnits
async fn list_units(state: &AppState, event: &AppSyncEvent) -> Response {
    let query = match event.parse_input::<ListUnitsInput>() {
        Ok(input) => input.into_query(),
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[(&query.account_id, "AccountID is required")]) {
        return response;
    }
    if query.filter.is_some() {
        tracing::debug!("Ignoring list filter");
    }

    match state.dynamic_units.list(&query).await {
        Ok(page) => {
            let response = page.into_response();
            let message = format!("Retrieved {} units", response.count);
            Response::success(response, message)
        }
        Err(e) => repository_failure(&e, codes::LIST_FAILED, "Failed to list units"),
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use serde_json::Value;

    use crate::config::UnitModel;

    const UNIT_TYPE: &str = "commercialVehicleType";

    fn state() -> AppState {
        AppState::in_memory(UnitModel::Dynamic)
    }

    fn event(field_name: &str, input: Value) -> AppSyncEvent {
        AppSyncEvent {
            field_name: field_name.to_string(),
            arguments: json!({ "input": input }),
            ..AppSyncEvent::default()
        }
    }

    async fn call(state: &AppState, field_name: &str, input: Value) -> Response {
        let event = event(field_name, input);
        handle(state, event.operation_type(), &event).await
    }

    async fn create_honda(state: &AppState) -> Value {
        let response = call(
            state,
            "createUnit",
            json!({
                "accountId": "acct-1",
                "unitType": UNIT_TYPE,
                "data": { "make": "Honda", "model": "Civic" }
            }),
        )
        .await;
        assert!(response.success, "{response:?}");
        response.data.unwrap()
    }

    #[tokio::test]
    async fn test_create_unit() {
        let state = state();
        let data = create_honda(&state).await;

        assert!(!data["id"].as_str().unwrap().is_empty());
        assert_eq!(data["accountId"], json!("acct-1"));
        assert_eq!(data["unitType"], json!(UNIT_TYPE));
        assert_eq!(data["make"], json!("Honda"));
        assert!(data["createdAt"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let state = state();
        let response = call(&state, "createUnit", json!({ "unitType": UNIT_TYPE })).await;
        let info = response.error.unwrap();
        assert_eq!(info.code, "VALIDATION_ERROR");
        assert_eq!(info.message, "AccountID is required");

        let response = call(&state, "createUnit", json!({ "accountId": "acct-1" })).await;
        assert_eq!(response.error.unwrap().message, "UnitType is required");
    }

    #[tokio::test]
    async fn test_create_unknown_unit_type() {
        let state = state();
        let response = call(
            &state,
            "createUnit",
            json!({ "accountId": "acct-1", "unitType": "spaceship", "data": {} }),
        )
        .await;
        let info = response.error.unwrap();
        assert_eq!(info.code, "VALIDATION_ERROR");
        assert_eq!(info.message, "Invalid unit type");
    }

    #[tokio::test]
    async fn test_create_schema_violation() {
        let state = state();
        let response = call(
            &state,
            "createUnit",
            json!({
                "accountId": "acct-1",
                "unitType": UNIT_TYPE,
                "data": { "make": "Honda", "invalidField": "x" }
            }),
        )
        .await;
        let info = response.error.unwrap();
        assert_eq!(info.code, "VALIDATION_ERROR");
        assert!(info.message.contains("invalidField"));
    }

    #[tokio::test]
    async fn test_create_invalid_input_shape() {
        let state = state();
        let response = call(&state, "createUnit", json!({ "accountId": 42 })).await;
        let info = response.error.unwrap();
        assert_eq!(info.code, "INVALID_INPUT");
        assert!(info.details.is_some());
    }

    #[tokio::test]
    async fn test_get_unit() {
        let state = state();
        let created = create_honda(&state).await;

        let response = call(
            &state,
            "getUnit",
            json!({ "id": created["id"], "accountId": "acct-1", "unitType": UNIT_TYPE }),
        )
        .await;
        assert!(response.success);
        assert_eq!(response.data.unwrap()["model"], json!("Civic"));
        assert_eq!(response.message.as_deref(), Some("Unit retrieved successfully"));

        let response = call(
            &state,
            "getUnit",
            json!({ "id": "missing", "accountId": "acct-1", "unitType": UNIT_TYPE }),
        )
        .await;
        let info = response.error.unwrap();
        assert_eq!(info.code, "NOT_FOUND");
        assert_eq!(info.message, "Unit not found");
    }

    #[tokio::test]
    async fn test_update_merges_delta() {
        let state = state();
        let created = create_honda(&state).await;

        let response = call(
            &state,
            "updateUnit",
            json!({
                "id": created["id"],
                "accountId": "acct-1",
                "unitType": UNIT_TYPE,
                "data": { "model": "Accord" }
            }),
        )
        .await;
        assert!(response.success, "{response:?}");
        let data = response.data.unwrap();
        assert_eq!(data["make"], json!("Honda"));
        assert_eq!(data["model"], json!("Accord"));
        assert_eq!(data["createdAt"], created["createdAt"]);
    }

    #[tokio::test]
    async fn test_update_missing_unit() {
        let state = state();
        let response = call(
            &state,
            "updateUnit",
            json!({ "id": "missing", "accountId": "acct-1", "unitType": UNIT_TYPE, "data": {} }),
        )
        .await;
        assert_eq!(response.error_code(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_update_schema_violation_keeps_stored_unit() {
        let state = state();
        let created = create_honda(&state).await;

        let response = call(
            &state,
            "updateUnit",
            json!({
                "id": created["id"],
                "accountId": "acct-1",
                "unitType": UNIT_TYPE,
                "data": { "invalidField": "x" }
            }),
        )
        .await;
        assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));

        let stored = call(
            &state,
            "getUnit",
            json!({ "id": created["id"], "accountId": "acct-1", "unitType": UNIT_TYPE }),
        )
        .await
        .data
        .unwrap();
        assert!(stored.get("invalidField").is_none());
    }

    #[tokio::test]
    async fn test_delete_unit() {
        let state = state();
        let created = create_honda(&state).await;
        let key = json!({ "id": created["id"], "accountId": "acct-1", "unitType": UNIT_TYPE });

        let response = call(&state, "deleteUnit", key.clone()).await;
        assert!(response.success);
        assert_eq!(
            response.data.unwrap(),
            json!({
                "id": created["id"],
                "accountId": "acct-1",
                "unitType": UNIT_TYPE,
                "deleted": true
            })
        );

        let response = call(&state, "getUnit", key.clone()).await;
        assert_eq!(response.error_code(), Some("NOT_FOUND"));

        let response = call(&state, "deleteUnit", key).await;
        assert_eq!(response.error_code(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_list_units_pages() {
        let state = state();
        for _ in 0..3 {
            create_honda(&state).await;
        }

        let response = call(
            &state,
            "listUnits",
            json!({ "accountId": "acct-1", "unitType": UNIT_TYPE, "limit": 2 }),
        )
        .await;
        assert_eq!(response.message.as_deref(), Some("Retrieved 2 units"));
        let data = response.data.unwrap();
        assert_eq!(data["count"], json!(2));
        let token = data["nextToken"].as_str().unwrap().to_string();

        let response = call(
            &state,
            "listUnits",
            json!({ "accountId": "acct-1", "limit": 2, "nextToken": token }),
        )
        .await;
        let data = response.data.unwrap();
        assert_eq!(data["count"], json!(1));
        assert!(data.get("nextToken").is_none() || data["nextToken"].is_null());
    }

    #[tokio::test]
    async fn test_list_units_ignores_location_id() {
        let state = state();
        create_honda(&state).await;

        let response = call(
            &state,
            "listUnits",
            json!({ "accountId": "acct-1", "locationId": "loc-1" }),
        )
        .await;
        assert_eq!(response.message.as_deref(), Some("Retrieved 1 units"));

        let response = call(
            &state,
            "listUnits",
            json!({ "accountId": "acct-1", "unitType": UNIT_TYPE, "locationId": "loc-1" }),
        )
        .await;
        assert_eq!(response.message.as_deref(), Some("Retrieved 1 units"));

        let response = call(
            &state,
            "listUnits",
            json!({ "accountId": "acct-1", "unitType": "passengerVehicleType" }),
        )
        .await;
        assert_eq!(response.message.as_deref(), Some("Retrieved 0 units"));
    }

    #[tokio::test]
    async fn test_list_units_bad_token() {
        let state = state();
        let response = call(
            &state,
            "listUnits",
            json!({ "accountId": "acct-1", "nextToken": "not base64!" }),
        )
        .await;
        assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_lookup_is_unknown_for_dynamic_units() {
        let state = state();
        let response = call(&state, "getUnitsById", json!({ "id": "abc" })).await;
        let info = response.error.unwrap();
        assert_eq!(info.code, "UNKNOWN_OPERATION");
        assert_eq!(info.message, "Unknown operation: getUnitsById");
    }
}
