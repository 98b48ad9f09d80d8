//! # Server Error Types
//!
//! [`XrpcError`] is the one error a request can end in. It renders as
//! `{"detail": ...}` with its status. Registration and startup failures have
//! their own enums since they never reach a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use thiserror::Error;
use xrpc_core::SpecError;
use xrpc_validation::FieldErrors;

/// An error answered to the client as `{"detail": ...}`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{status}: {detail}")]
pub struct XrpcError {
    status: StatusCode,
    detail: Value,
}

impl XrpcError {
    pub fn new(status: StatusCode, detail: impl Into<Value>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<Value>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn unauthorized(detail: impl Into<Value>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn forbidden(detail: impl Into<Value>) -> Self {
        Self::new(StatusCode::FORBIDDEN, detail)
    }

    pub fn not_found(detail: impl Into<Value>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<Value>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// 400 carrying the alias-keyed message map.
    pub fn validation(errors: FieldErrors) -> Self {
        let detail: Map<String, Value> = errors
            .iter()
            .map(|(key, message)| (key.to_string(), Value::String(message.to_string())))
            .collect();
        Self::bad_request(Value::Object(detail))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }
}

impl IntoResponse for XrpcError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, detail = %self.detail, "procedure failed");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<anyhow::Error> for XrpcError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<XrpcError>() {
            Ok(err) => err,
            Err(err) => Self::internal(format!("{err:#}")),
        }
    }
}

impl From<serde_json::Error> for XrpcError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<std::io::Error> for XrpcError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<FieldErrors> for XrpcError {
    fn from(errors: FieldErrors) -> Self {
        Self::validation(errors)
    }
}

/// A procedure could not be mounted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Another procedure already owns the canonical path.
    #[error("procedure path '{path}' is already registered")]
    DuplicatePath { path: String },

    /// The path contains characters the router treats as captures.
    #[error("procedure path '{path}' is invalid: {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

/// The server could not start.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to write spec: {0}")]
    Spec(#[from] SpecError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: XrpcError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_detail_envelope() {
        let (status, body) = response_parts(XrpcError::unauthorized("missing token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "missing token"}));
    }

    #[tokio::test]
    async fn validation_detail_is_a_map() {
        let mut errors = FieldErrors::default();
        errors.insert("limit", "max value required is 10");
        let (status, body) = response_parts(XrpcError::validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": {"limit": "max value required is 10"}}));
    }

    #[test]
    fn anyhow_keeps_embedded_status() {
        let err = anyhow::Error::new(XrpcError::forbidden("nope"));
        assert_eq!(XrpcError::from(err).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn anyhow_without_status_is_internal() {
        let err = anyhow::anyhow!("database offline");
        let err = XrpcError::from(err);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), &json!("database offline"));
    }

    #[test]
    fn display_includes_status() {
        let err = XrpcError::not_found("post 7");
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("post 7"));
    }
}
