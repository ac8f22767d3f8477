//! HTTP mapping of [`Error`].

use crate::errors::{Error, PurchaseRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{debug, error};

use super::response::error as error_response;

impl Error {
    /// Status code returned to HTTP clients.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied { .. } | Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvariantViolation { .. }
            | Self::Database(_)
            | Self::Config { .. }
            | Self::Io(_)
            | Self::EnvVar(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            Self::Conflict {
                hall_id,
                session_id,
            } => Some(json!({ "hall_id": hall_id, "session_id": session_id })),
            Self::Rejected(rejection) => Some(match rejection {
                PurchaseRejection::DateInPast { show_date } => json!({ "show_date": show_date }),
                PurchaseRejection::SessionStarted { start_time } => {
                    json!({ "start_time": start_time })
                }
                PurchaseRejection::OutsideRun {
                    show_date,
                    start_date,
                    end_date,
                } => json!({
                    "show_date": show_date,
                    "start_date": start_date,
                    "end_date": end_date,
                }),
                PurchaseRejection::InsufficientCapacity {
                    available,
                    requested,
                } => json!({ "available": available, "requested": requested }),
                PurchaseRejection::InsufficientFunds { balance, required } => {
                    json!({ "balance": balance, "required": required })
                }
            }),
            _ => None,
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // internals stay in the log
        let public_message = if status.is_server_error() {
            error!(error = ?self, "Request failed");
            "An internal error occurred".to_string()
        } else {
            debug!(code, message = %self, "Request rejected");
            self.to_string()
        };

        error_response(code, public_message, self.details(), status)
    }
}
