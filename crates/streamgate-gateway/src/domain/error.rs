//! Gateway error types and their HTTP envelopes.
//!
//! Handler errors all render as `{"error": "..."}` JSON; the status code
//! says whose fault it was. Authentication failures never reach this type,
//! they short-circuit in the middleware with a bare 401.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced by the gateway service
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration rejected at startup
    #[error("configuration error: {0}")]
    Config(String),

    /// Listen address could not be bound
    #[error("bind error: {0}")]
    Bind(String),

    /// Catalog store fault
    #[error("store error: {0}")]
    Store(String),

    /// Video host unreachable or misbehaving
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Caller sent something the route cannot use
    #[error("{0}")]
    BadRequest(String),
}

impl GatewayError {
    /// HTTP status this error renders as
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Config(_) | GatewayError::Bind(_) | GatewayError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
