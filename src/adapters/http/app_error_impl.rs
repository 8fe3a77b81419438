use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::Database(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError, None)
            }
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, Some(msg))
            }
            AppError::NotFound => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, None)
            }
            // Settlement validation failures are deliberate 4xx so the
            // gateway's retry policy gives up instead of hammering us.
            AppError::AmountMismatch => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::AmountMismatch, None)
            }
            AppError::GatewayProjectMismatch => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::GatewayProjectMismatch, None)
            }
            AppError::GatewayNotConfigured => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::GatewayNotConfigured, None)
            }
            AppError::Upstream(_) => {
                error_resp(StatusCode::BAD_GATEWAY, ErrorCode::UpstreamError, None)
            }
            AppError::Internal(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError, None)
            }
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
