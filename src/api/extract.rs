//! Extractors whose rejections are reported in the error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::Error;

/// JSON body. A missing, malformed or mistyped body is a validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// Query string, rejected the same way as [`ApiJson`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
