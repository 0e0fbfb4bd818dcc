use units_core::storage::{
    caller_message, error_code, repository_error_to_status_code, RepositoryError,
};

use crate::appsync::{codes, Response};

/// Converts a repository failure into the response envelope.
///
/// Caller-meaningful errors keep their own code and message. Internal failures are
/// logged and reported under the operation's failure code without leaking details.
pub fn repository_failure(
    error: &RepositoryError,
    failure_code: &'static str,
    failure_message: &str,
) -> Response {
    if repository_error_to_status_code(error) >= 500 {
        tracing::error!(error = %error, code = failure_code, "{failure_message}");
        return Response::error(failure_code, failure_message, None);
    }

    tracing::warn!(error = %error, code = error_code(error), "Request rejected");
    Response::error(error_code(error), caller_message(error), None)
}

/// Response for an input that fails field validation.
pub fn validation_failure(message: &str) -> Response {
    tracing::warn!(message, "Validation failed");
    Response::error(codes::VALIDATION_ERROR, message, None)
}

/// Response for an input that cannot be deserialized.
pub fn invalid_input(error: &serde_json::Error) -> Response {
    tracing::warn!(error = %error, "Invalid input parameters");
    Response::error(
        codes::INVALID_INPUT,
        "Invalid input parameters",
        Some(error.to_string()),
    )
}

/// Returns a validation failure for the first empty required field.
pub fn require_fields(fields: &[(&str, &str)]) -> Option<Response> {
    fields
        .iter()
        .find(|(value, _)| value.trim().is_empty())
        .map(|(_, message)| validation_failure(message))
}
