use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            // Server-side failures keep their detail in the log only.
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = ?self, "Request failed");
            }
            _ => tracing::warn!(error = %self, "Request rejected"),
        }

        match self {
            AppError::Database(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                "Internal server error",
            ),
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, &msg)
            }
            AppError::DuplicateEmail => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::DuplicateEmail,
                "Email already exists in waitlist",
            ),
            AppError::Unauthenticated => error_resp(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthenticated,
                "Access token required",
            ),
            AppError::InvalidToken(_) => {
                error_resp(StatusCode::FORBIDDEN, ErrorCode::InvalidToken, "Invalid token")
            }
            AppError::Forbidden => error_resp(
                StatusCode::FORBIDDEN,
                ErrorCode::Forbidden,
                "Admin access required",
            ),
            AppError::EmailNotVerified => error_resp(
                StatusCode::FORBIDDEN,
                ErrorCode::EmailNotVerified,
                "Email address not verified",
            ),
            AppError::AlreadyLinked => error_resp(
                StatusCode::CONFLICT,
                ErrorCode::AlreadyLinked,
                "Waitlist entry is linked to another account",
            ),
            AppError::NotFound => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not found")
            }
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                "Internal server error",
            ),
        }
    }
}

/// Malformed or non-JSON bodies answer like any other invalid input.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        AppError::InvalidInput("Invalid request body".into())
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: &str) -> Response {
    let body = serde_json::json!({ "code": code.as_str(), "message": message });
    (status, Json(body)).into_response()
}
