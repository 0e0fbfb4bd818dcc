//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `units_core::storage`. Conditional
//! check failures carry meaning for the caller; everything else is an internal
//! failure tagged with the operation that raised it.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use units_core::storage::RepositoryError;

/// What a conditional put required of the existing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutGuard {
    /// Create: the key must be free.
    MustNotExist,
    /// Update: the item must exist and be live.
    MustBeLive,
}

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    let message = match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => "Table not found".to_string(),
        GetItemError::ProvisionedThroughputExceededException(_) => {
            "Throughput exceeded, please retry".to_string()
        }
        GetItemError::RequestLimitExceeded(_) => {
            "Request limit exceeded, please retry".to_string()
        }
        GetItemError::InternalServerError(_) => "DynamoDB internal server error".to_string(),
        err => format!("GetItem failed: {:?}", err),
    };
    RepositoryError::internal("get_item", message)
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
    operation: &'static str,
) -> RepositoryError {
    let message = match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => "Table or index not found".to_string(),
        QueryError::ProvisionedThroughputExceededException(_) => {
            "Throughput exceeded, please retry".to_string()
        }
        QueryError::RequestLimitExceeded(_) => "Request limit exceeded, please retry".to_string(),
        QueryError::InternalServerError(_) => "DynamoDB internal server error".to_string(),
        err => format!("Query failed: {:?}", err),
    };
    RepositoryError::internal(operation, message)
}

/// Map a PutItem SDK error to RepositoryError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    guard: Option<PutGuard>,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    put_item_service_error(err.into_service_error(), guard, entity_type, id.into())
}

fn put_item_service_error(
    err: PutItemError,
    guard: Option<PutGuard>,
    entity_type: &'static str,
    id: String,
) -> RepositoryError {
    let operation = match guard {
        Some(PutGuard::MustNotExist) => "create",
        Some(PutGuard::MustBeLive) => "update",
        None => "delete",
    };
    let message = match err {
        PutItemError::ConditionalCheckFailedException(_) => {
            return match guard {
                Some(PutGuard::MustNotExist) => RepositoryError::AlreadyExists { entity_type, id },
                Some(PutGuard::MustBeLive) => {
                    RepositoryError::NotFoundOrDeleted { entity_type, id }
                }
                None => RepositoryError::internal(operation, "unexpected conditional check"),
            };
        }
        PutItemError::ResourceNotFoundException(_) => "Table not found".to_string(),
        PutItemError::ProvisionedThroughputExceededException(_) => {
            "Throughput exceeded, please retry".to_string()
        }
        PutItemError::RequestLimitExceeded(_) => {
            "Request limit exceeded, please retry".to_string()
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            "Item collection size limit exceeded".to_string()
        }
        PutItemError::TransactionConflictException(_) => {
            "Transaction conflict, please retry".to_string()
        }
        PutItemError::InternalServerError(_) => "DynamoDB internal server error".to_string(),
        err => format!("PutItem failed: {:?}", err),
    };
    RepositoryError::internal(operation, message)
}
