use thiserror::Error;

use crate::pagination::PaginationError;
use crate::schema::SchemaError;
use crate::unit::KeyError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unsupported unit type: {0}")]
    UnsupportedUnitType(String),
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} not found or deleted: {id}")]
    NotFoundOrDeleted {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid pagination token: {0}")]
    InvalidPaginationToken(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("{operation} failed: {message}")]
    Internal {
        operation: &'static str,
        message: String,
    },
}

impl RepositoryError {
    /// Wraps an unexpected store or transport failure with the operation name.
    pub fn internal(operation: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Internal {
            operation,
            message: error.to_string(),
        }
    }
}

impl From<KeyError> for RepositoryError {
    fn from(error: KeyError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<SchemaError> for RepositoryError {
    fn from(error: SchemaError) -> Self {
        match error {
            SchemaError::UnsupportedUnitType(unit_type) => Self::UnsupportedUnitType(unit_type),
            SchemaError::Invalid { .. } => Self::Validation(error.to_string()),
            SchemaError::Compile { .. } => Self::internal("load_schema", error),
        }
    }
}

impl From<PaginationError> for RepositoryError {
    fn from(error: PaginationError) -> Self {
        Self::InvalidPaginationToken(error.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Violation;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "Unit",
            id: "acct-1/commercialVehicleType#abc".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unit not found: acct-1/commercialVehicleType#abc"
        );
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "Unit",
            id: "acct-1/commercialVehicleType#abc".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unit already exists: acct-1/commercialVehicleType#abc"
        );
    }

    #[test]
    fn test_repository_error_internal_display() {
        let error = RepositoryError::internal("create", "throttled");
        assert_eq!(error.to_string(), "create failed: throttled");
    }

    #[test]
    fn test_key_error_is_validation() {
        let error: RepositoryError = KeyError::MissingComponent("accountId").into();
        assert_eq!(
            error,
            RepositoryError::Validation("accountId is required".to_string())
        );
    }

    #[test]
    fn test_schema_error_conversion() {
        let unsupported: RepositoryError = SchemaError::UnsupportedUnitType("boat".into()).into();
        assert_eq!(
            unsupported,
            RepositoryError::UnsupportedUnitType("boat".to_string())
        );

        let invalid: RepositoryError = SchemaError::Invalid {
            unit_type: "commercialVehicleType".into(),
            violations: vec![Violation {
                path: "/make".into(),
                message: "5 is not of type \"string\"".into(),
            }],
        }
        .into();
        assert!(matches!(invalid, RepositoryError::Validation(msg) if msg.contains("/make")));

        let compile: RepositoryError = SchemaError::Compile {
            unit_type: "broken".into(),
            message: "bad".into(),
        }
        .into();
        assert!(matches!(
            compile,
            RepositoryError::Internal {
                operation: "load_schema",
                ..
            }
        ));
    }

    #[test]
    fn test_pagination_error_conversion() {
        let error: RepositoryError = PaginationError::InvalidEncoding("bad byte".into()).into();
        assert!(matches!(error, RepositoryError::InvalidPaginationToken(_)));
    }
}
