//! Pure functions for mapping repository errors to caller-facing codes.
//!
//! This module provides the stable error code, the HTTP status and the message a
//! caller is allowed to see for each [`RepositoryError`] variant.

use super::RepositoryError;

/// Message returned to callers in place of internal failure details.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Maps a [`RepositoryError`] to its stable error code.
///
/// # Examples
///
/// ```
/// use units_core::storage::{RepositoryError, error_code};
///
/// let error = RepositoryError::NotFoundOrDeleted {
///     entity_type: "Unit",
///     id: "acct-1/commercialVehicleType#abc".to_string(),
/// };
/// assert_eq!(error_code(&error), "NOT_FOUND_OR_DELETED");
/// ```
pub fn error_code(error: &RepositoryError) -> &'static str {
    match error {
        RepositoryError::Validation(_) | RepositoryError::InvalidPaginationToken(_) => {
            "VALIDATION_ERROR"
        }
        RepositoryError::UnsupportedUnitType(_) => "NOT_SUPPORTED",
        RepositoryError::AlreadyExists { .. } => "ALREADY_EXISTS",
        RepositoryError::NotFound { .. } => "NOT_FOUND",
        RepositoryError::NotFoundOrDeleted { .. } => "NOT_FOUND_OR_DELETED",
        RepositoryError::Serialization(_)
        | RepositoryError::InvalidData(_)
        | RepositoryError::Internal { .. } => "INTERNAL_ERROR",
    }
}

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `Validation`, `InvalidPaginationToken`, `UnsupportedUnitType` -> 400 (Bad Request)
/// - `NotFound`, `NotFoundOrDeleted` -> 404 (Not Found)
/// - `AlreadyExists` -> 409 (Conflict)
/// - `Serialization`, `InvalidData`, `Internal` -> 500 (Internal Server Error)
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::Validation(_)
        | RepositoryError::InvalidPaginationToken(_)
        | RepositoryError::UnsupportedUnitType(_) => 400,
        RepositoryError::NotFound { .. } | RepositoryError::NotFoundOrDeleted { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::Serialization(_)
        | RepositoryError::InvalidData(_)
        | RepositoryError::Internal { .. } => 500,
    }
}

/// The message a caller may see. Internal failures are replaced by a generic text.
pub fn caller_message(error: &RepositoryError) -> String {
    match error {
        RepositoryError::Serialization(_)
        | RepositoryError::InvalidData(_)
        | RepositoryError::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let error = RepositoryError::Validation("accountId is required".to_string());
        assert_eq!(error_code(&error), "VALIDATION_ERROR");
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_bad_token_is_a_validation_error() {
        let error = RepositoryError::InvalidPaginationToken("bad".to_string());
        assert_eq!(error_code(&error), "VALIDATION_ERROR");
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_unsupported_maps_to_not_supported() {
        let error = RepositoryError::UnsupportedUnitType("boat".to_string());
        assert_eq!(error_code(&error), "NOT_SUPPORTED");
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_already_exists_maps_to_409() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "Unit",
            id: "unit-456".to_string(),
        };
        assert_eq!(error_code(&error), "ALREADY_EXISTS");
        assert_eq!(repository_error_to_status_code(&error), 409);
    }

    #[test]
    fn test_not_found_variants_map_to_404() {
        let not_found = RepositoryError::NotFound {
            entity_type: "Unit",
            id: "unit-123".to_string(),
        };
        let gone = RepositoryError::NotFoundOrDeleted {
            entity_type: "Unit",
            id: "unit-123".to_string(),
        };
        assert_eq!(error_code(&not_found), "NOT_FOUND");
        assert_eq!(error_code(&gone), "NOT_FOUND_OR_DELETED");
        assert_eq!(repository_error_to_status_code(&not_found), 404);
        assert_eq!(repository_error_to_status_code(&gone), 404);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error = RepositoryError::internal("list", "ProvisionedThroughputExceeded: table units");
        assert_eq!(error_code(&error), "INTERNAL_ERROR");
        assert_eq!(repository_error_to_status_code(&error), 500);
        assert_eq!(caller_message(&error), INTERNAL_ERROR_MESSAGE);

        let corrupt = RepositoryError::InvalidData("Missing or invalid field: pk".to_string());
        assert_eq!(caller_message(&corrupt), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_caller_errors_are_reported_verbatim() {
        let error = RepositoryError::Validation("locationId is required".to_string());
        assert_eq!(caller_message(&error), "Validation error: locationId is required");
    }
}
