//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bieterrunde_shared::AppError;
use tracing::{error, warn};

/// Converts an error into a JSON response with `error` and `message` fields.
///
/// Server errors are logged with their details; clients only see a generic message.
pub fn error_response(err: impl Into<AppError>) -> Response {
    let err = err.into();
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %err, "Request failed");
    } else {
        warn!(error = %err, code = err.error_code(), "Request rejected");
    }

    (status, Json(err.to_body())).into_response()
}
