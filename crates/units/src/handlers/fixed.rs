//! Resolvers for fixed-schema commercial vehicle units.
//!
//! The sort key discriminator is the location id. Updates replace the stored
//! attributes wholesale; only the creation time is carried over.

use serde_json::json;

use units_core::storage::ListUnitsResponse;
use units_core::unit::{FixedUnit, Timestamps, UnitRecord};

use super::error::{invalid_input, repository_failure, require_fields};
use crate::appsync::{
    codes, AppSyncEvent, ListLocationUnitsInput, LocationKeyInput, LookupByIdInput, OperationType,
    Response,
};
use crate::state::AppState;

pub async fn handle(state: &AppState, operation: OperationType, event: &AppSyncEvent) -> Response {
    match operation {
        OperationType::Create => create_unit(state, event).await,
        OperationType::Read => get_unit(state, event).await,
        OperationType::Update => update_unit(state, event).await,
        OperationType::Delete => delete_unit(state, event).await,
        OperationType::List => list_units(state, event).await,
        OperationType::LookupById => get_units_by_id(state, event).await,
        OperationType::Unknown => super::unknown_operation(event),
    }
}

/// createUnit: the id and bookkeeping fields are always assigned here.
async fn create_unit(state: &AppState, event: &AppSyncEvent) -> Response {
    let mut unit: FixedUnit = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[
        (&unit.account_id, "AccountID is required"),
        (&unit.location_id, "LocationID is required"),
    ]) {
        return response;
    }

    unit.id.clear();
    unit.timestamps = Timestamps::default();

    match state.fixed_units.create(&mut unit).await {
        Ok(()) => {
            tracing::info!(id = %unit.id, account_id = %unit.account_id, location_id = %unit.location_id, "Unit created");
            Response::success(unit.to_document(), "Unit created successfully")
        }
        Err(e) => repository_failure(&e, codes::CREATE_FAILED, "Failed to create unit"),
    }
}

/// getUnit
async fn get_unit(state: &AppState, event: &AppSyncEvent) -> Response {
    let input: LocationKeyInput = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_key(&input) {
        return response;
    }

    match state
        .fixed_units
        .get_by_id(&input.account_id, &input.location_id, &input.id)
        .await
    {
        Ok(Some(unit)) => Response::success(unit.to_document(), "Unit retrieved successfully"),
        Ok(None) => Response::error(codes::NOT_FOUND, "Unit not found", None),
        Err(e) => repository_failure(&e, codes::READ_FAILED, "Failed to retrieve unit"),
    }
}

/// updateUnit
async fn update_unit(state: &AppState, event: &AppSyncEvent) -> Response {
    let mut unit: FixedUnit = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[
        (&unit.id, "ID is required"),
        (&unit.account_id, "AccountID is required"),
        (&unit.location_id, "LocationID is required"),
    ]) {
        return response;
    }

    let existing = state
        .fixed_units
        .get_by_id(&unit.account_id, &unit.location_id, &unit.id)
        .await;
    let existing = match existing {
        Ok(Some(existing)) => existing,
        Ok(None) => return Response::error(codes::NOT_FOUND, "Unit not found", None),
        Err(e) => {
            return repository_failure(
                &e,
                codes::UPDATE_FAILED,
                "Failed to verify unit existence",
            )
        }
    };

    unit.timestamps = existing.timestamps;
    match state.fixed_units.update(&mut unit).await {
        Ok(()) => {
            tracing::info!(id = %unit.id, account_id = %unit.account_id, "Unit updated");
            Response::success(unit.to_document(), "Unit updated successfully")
        }
        Err(e) => repository_failure(&e, codes::UPDATE_FAILED, "Failed to update unit"),
    }
}

/// deleteUnit
async fn delete_unit(state: &AppState, event: &AppSyncEvent) -> Response {
    let input: LocationKeyInput = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_key(&input) {
        return response;
    }

    match state
        .fixed_units
        .delete(&input.account_id, &input.location_id, &input.id)
        .await
    {
        Ok(()) => {
            tracing::info!(id = %input.id, account_id = %input.account_id, "Unit deleted");
            Response::success(
                json!({
                    "id": input.id,
                    "accountId": input.account_id,
                    "locationId": input.location_id,
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
    let query = match event.parse_input::<ListLocationUnitsInput>() {
        Ok(input) => input.into_query(),
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[(&query.account_id, "AccountID is required")]) {
        return response;
    }

    match state.fixed_units.list(&query).await {
        Ok(page) => {
            let response = page.into_response();
            let message = format!("Retrieved {} units", response.count);
            Response::success(response, message)
        }
        Err(e) => repository_failure(&e, codes::LIST_FAILED, "Failed to list units"),
    }
}

/// getUnitsById: every live unit with the id, across accounts and locations.
async fn get_units_by_id(state: &AppState, event: &AppSyncEvent) -> Response {
    let input: LookupByIdInput = match event.parse_input() {
        Ok(input) => input,
        Err(e) => return invalid_input(&e),
    };
    if let Some(response) = require_fields(&[(&input.id, "ID is required")]) {
        return response;
    }

    match state.unit_lookup.find_by_id(&input.id).await {
        Ok(units) => {
            let response = ListUnitsResponse {
                count: units.len(),
                items: units.iter().map(UnitRecord::to_document).collect(),
                next_token: None,
            };
            let message = format!("Retrieved {} units", response.count);
            Response::success(response, message)
        }
        Err(e) => repository_failure(&e, codes::READ_FAILED, "Failed to retrieve unit"),
    }
}

fn require_key(input: &LocationKeyInput) -> Option<Response> {
    require_fields(&[
        (&input.id, "ID is required"),
        (&input.account_id, "AccountID is required"),
        (&input.location_id, "LocationID is required"),
    ])
}
