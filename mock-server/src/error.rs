use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Handler failures, rendered in the backend's error body shapes.
#[derive(Debug)]
pub enum AppError {
    /// 401 `{"error": ...}`
    Unauthorized(&'static str),
    /// 403 `{"error": ...}`
    Forbidden(&'static str),
    /// 404 `{"error": ...}`
    NotFound(&'static str),
    /// 400 `{"error": ...}`
    BadRequest(String),
    /// 422 `{"errors": [{"msg": ...}]}`
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "errors": [{ "msg": msg }] }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Reject blank required fields the way the backend's validators do.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
