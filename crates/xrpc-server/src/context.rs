//! # Request Context
//!
//! [`RequestScope`] is the untyped part of a request: transport metadata,
//! locals, services and the state interceptors leave behind. [`Context`]
//! adds the bound, validated input and is what procedure interceptors and
//! handlers receive. Both are built fresh for every request.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use axum::http::{HeaderMap, Method, Uri};
use serde_json::Value;

use crate::error::XrpcError;
use crate::inject::Injector;
use crate::locals::Locals;

/// Per-request state shared by every pipeline stage.
#[derive(Debug)]
pub struct RequestScope {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    raw_input: Value,
    locals: Locals,
    injector: Arc<Injector>,
    advisories: Vec<XrpcError>,
    response_headers: HeaderMap,
}

impl RequestScope {
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        raw_input: Value,
        locals: Locals,
        injector: Arc<Injector>,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            raw_input,
            locals,
            injector,
            advisories: Vec::new(),
            response_headers: HeaderMap::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a request header, if it is valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The decoded payload before typed binding, with keys normalized.
    pub fn raw_input(&self) -> &Value {
        &self.raw_input
    }

    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut Locals {
        &mut self.locals
    }

    pub fn injector(&self) -> &Arc<Injector> {
        &self.injector
    }

    /// Resolve a service, answering 500 if it is unavailable.
    pub fn service<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, XrpcError> {
        self.injector
            .invoke::<T>()
            .map_err(|err| XrpcError::internal(err.to_string()))
    }

    /// Errors reported by interceptors that let the request continue.
    pub fn advisories(&self) -> &[XrpcError] {
        &self.advisories
    }

    pub(crate) fn push_advisory(&mut self, error: XrpcError) {
        self.advisories.push(error);
    }

    /// Headers added to the response. Changes made by the handler itself are
    /// not seen; use [`Reply::header`](crate::Reply::header) there.
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    pub(crate) fn take_response_headers(&mut self) -> HeaderMap {
        std::mem::take(&mut self.response_headers)
    }
}

/// The typed input of one request plus its [`RequestScope`].
#[derive(Debug)]
pub struct Context<I> {
    pub input: I,
    scope: RequestScope,
}

impl<I> Context<I> {
    pub fn new(input: I, scope: RequestScope) -> Self {
        Self { input, scope }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut RequestScope {
        &mut self.scope
    }

    pub fn into_parts(self) -> (I, RequestScope) {
        (self.input, self.scope)
    }
}

impl<I> Deref for Context<I> {
    type Target = RequestScope;

    fn deref(&self) -> &RequestScope {
        &self.scope
    }
}

impl<I> DerefMut for Context<I> {
    fn deref_mut(&mut self) -> &mut RequestScope {
        &mut self.scope
    }
}
