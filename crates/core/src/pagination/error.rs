use thiserror::Error;

/// Errors raised by the pagination token codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("failed to decode pagination token: {0}")]
    InvalidEncoding(String),
    #[error("failed to unmarshal pagination token: {0}")]
    InvalidFormat(String),
    #[error("unsupported value for key attribute {name}: {value}")]
    InvalidAttribute { name: String, value: String },
    #[error("failed to marshal pagination key: {0}")]
    Encode(String),
}
