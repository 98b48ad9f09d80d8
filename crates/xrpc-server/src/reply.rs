//! Successful handler results.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// A typed response body with its status and extra headers.
#[derive(Debug, Clone)]
pub struct Reply<O> {
    status: StatusCode,
    body: O,
    headers: HeaderMap,
}

impl<O> Reply<O> {
    pub fn new(status: StatusCode, body: O) -> Self {
        Self {
            status,
            body,
            headers: HeaderMap::new(),
        }
    }

    /// 200 OK.
    pub fn ok(body: O) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// 201 Created.
    pub fn created(body: O) -> Self {
        Self::new(StatusCode::CREATED, body)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &O {
        &self.body
    }
}

impl<O: Serialize> IntoResponse for Reply<O> {
    fn into_response(self) -> Response {
        (self.status, self.headers, Json(self.body)).into_response()
    }
}
