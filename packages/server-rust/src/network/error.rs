//! Transport-level failures and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::endpoint::EndpointError;

/// Infrastructure failures surfaced to HTTP clients.
///
/// Business failures never become a `TransportError`; they are encoded in a
/// 200 response body by the endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request body was not a valid request for the operation.
    #[error("invalid request body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

impl TransportError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Endpoint(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(status = status.as_u16(), error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_is_bad_request() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let resp = TransportError::Decode(err).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn endpoint_error_is_internal() {
        let err: TransportError = EndpointError::from(anyhow::anyhow!("boom")).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "internal error: boom");
    }
}
