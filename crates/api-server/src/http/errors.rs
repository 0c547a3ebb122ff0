use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ErrorBody, ErrorResponse};
use shared::repos::StoreError;
use tracing::{error, warn};

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}

pub(super) fn bad_request_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, code, message)
}

pub(super) fn not_found_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, code, message)
}

pub(super) fn conflict_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::CONFLICT, code, message)
}

pub(super) fn community_unavailable_response() -> Response {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "community_unavailable",
        "Community questions are not configured on this server",
    )
}

pub(super) fn internal_error_response() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Unexpected server error",
    )
}

pub(super) fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound => not_found_response("not_found", "Record not found"),
        StoreError::Rejected { status, message } => {
            warn!(status, "record store rejected request: {message}");
            error_response(
                StatusCode::BAD_GATEWAY,
                "store_rejected",
                "Record store rejected the request",
            )
        }
        other => {
            error!("record store operation failed: {other}");
            error_response(
                StatusCode::BAD_GATEWAY,
                "store_unavailable",
                "Record store is unavailable",
            )
        }
    }
}
