use axum::response::Response;
use serde::Serialize;

use crate::api::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

/// `GET /health`
pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "box-office",
    };

    success(payload, "Health check successful")
}
