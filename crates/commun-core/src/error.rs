use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body returned for every failed request.
///
/// `success` is always `false`; `kind` is a stable SCREAMING_SNAKE_CASE code
/// and `message` is safe to show to end users.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub kind: &'static str,
    pub message: String,
}

/// Build an error response with the shared body shape.
pub fn error_response(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        success: false,
        kind,
        message: message.into(),
    };
    (status, axum::Json(body)).into_response()
}

/// Router fallback for unknown paths.
pub async fn route_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND", "route not found")
}
