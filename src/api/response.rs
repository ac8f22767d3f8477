//! JSON envelope shared by every endpoint.
//!
//! Success bodies are `{success: true, data, message}`; error bodies are
//! `{success: false, error: {code, message, details}}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// Body of a successful response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// Always true
    pub success: bool,
    /// Payload
    pub data: Option<T>,
    /// Human-readable summary
    pub message: Option<String>,
}

/// The `error` object of a failed response.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Structured extras, such as the seats still available
    pub details: Option<Value>,
}

/// Body of a failed response.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    /// Always false
    pub success: bool,
    /// What went wrong
    pub error: ApiErrorBody,
}

fn with_status<T>(status: StatusCode, data: Option<T>, message: String) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data,
        message: Some(message),
    };
    (status, Json(body)).into_response()
}

/// 200 with a payload.
pub fn success<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    with_status(StatusCode::OK, Some(data), message.into())
}

/// 201 with the created resource.
pub fn created<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    with_status(StatusCode::CREATED, Some(data), message.into())
}

/// 200 without a payload.
pub fn empty_success(message: impl Into<String>) -> Response {
    with_status::<()>(StatusCode::OK, None, message.into())
}

/// An error envelope with the given status.
pub fn error(
    code: &str,
    message: impl Into<String>,
    details: Option<Value>,
    status: StatusCode,
) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: ApiErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    };

    (status, Json(body)).into_response()
}
