//! API error envelope with HTTP status mapping.
//!
//! Every error leaving a handler is serialized as
//! `{"error":{"code","message"}}` with one of the stable codes clients
//! switch on. Messages returned to clients are sanitized; detailed causes
//! are logged server-side only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use portico_core::StoreError;
use tracing::error;

/// Errors surfaced to API clients.
///
/// # Error Classification
///
/// - `InvalidArgument` — client sent something unusable; permanent.
/// - `Unauthenticated` — missing or failed credential/signature check;
///   expected and frequent under adversarial traffic, never logged at
///   error severity.
/// - `NotFound` — the addressed resource (tenant, chat session) does not
///   exist; a first-class outcome, not a fault.
/// - `Internal` — server-side fault. The response body never reveals
///   whether the cause was configuration or infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Unauthenticated { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    /// Convenience constructor for the common tenant-scoped 404.
    pub fn tenant_not_found() -> Self {
        Self::NotFound {
            message: "Tenant not found".to_string(),
        }
    }

    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Unauthenticated { .. } => "UNAUTHENTICATED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal => "INTERNAL",
        }
    }

    /// HTTP status the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Store faults become a generic server fault. The cause is logged here;
/// the client must not learn whether the store is down or misconfigured,
/// and the outage must never read as "tenant not found".
impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        error!(error = %error, transient = error.is_transient(), "Tenant store failure");
        Self::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
