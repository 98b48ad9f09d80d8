//! # Interceptor Flow
//!
//! Every interceptor returns a [`Flow`] that tells the pipeline whether to
//! keep going, keep going with a recorded error, stop with an error, or stop
//! with a response of its own.
//!
//! Interceptors are async: each returns a boxed [`FlowFuture`] borrowing the
//! request state, so it can await services before deciding. Synchronous
//! checks wrap their result with [`Flow::ready`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::context::{Context, RequestScope};
use crate::error::XrpcError;

/// Outcome of one interceptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Run the next stage.
    Continue,
    /// Record a non-fatal error on the scope and run the next stage.
    Advise(XrpcError),
    /// Stop and answer with the error.
    Halt(XrpcError),
    /// Stop and answer with `body` at `status`.
    Respond(StatusCode, Value),
}

impl Flow {
    /// Stop with `err`. Shorthand for `Flow::Halt(err.into())`.
    pub fn halt(err: impl Into<XrpcError>) -> Self {
        Self::Halt(err.into())
    }

    /// Stop with a 200 JSON body.
    pub fn respond(body: impl Into<Value>) -> Self {
        Self::Respond(StatusCode::OK, body.into())
    }

    /// An already resolved future, for interceptors that never await.
    pub fn ready<'a>(self) -> FlowFuture<'a> {
        Box::pin(std::future::ready(self))
    }

    /// Apply the outcome to `scope`. Returns the response when the pipeline
    /// must stop.
    pub(crate) fn settle(self, path: &str, scope: &mut RequestScope) -> Option<Response> {
        match self {
            Self::Continue => None,
            Self::Advise(err) => {
                tracing::warn!(path, status = %err.status(), detail = %err.detail(), "interceptor advisory");
                scope.push_advisory(err);
                None
            }
            Self::Halt(err) => {
                tracing::debug!(path, status = %err.status(), "interceptor halted request");
                Some(err.into_response())
            }
            Self::Respond(status, body) => {
                tracing::debug!(path, %status, "interceptor answered request");
                Some((status, Json(body)).into_response())
            }
        }
    }
}

impl From<Result<(), XrpcError>> for Flow {
    fn from(result: Result<(), XrpcError>) -> Self {
        match result {
            Ok(()) => Self::Continue,
            Err(err) => Self::Halt(err),
        }
    }
}

/// Future an interceptor resolves to, borrowing the request state for `'a`.
pub type FlowFuture<'a> = Pin<Box<dyn Future<Output = Flow> + Send + 'a>>;

/// App-level interceptor; runs before any procedure interceptor.
pub type RootInterceptor =
    Arc<dyn for<'a> Fn(&'a mut RequestScope) -> FlowFuture<'a> + Send + Sync>;

/// Procedure-level interceptor over the typed context.
pub type Interceptor<I> =
    Arc<dyn for<'a> Fn(&'a mut Context<I>) -> FlowFuture<'a> + Send + Sync>;

/// Box a closure as an [`Interceptor`], for use with
/// [`Procedure::intercept_all`](crate::Procedure::intercept_all).
pub fn interceptor<I, F>(f: F) -> Interceptor<I>
where
    F: for<'a> Fn(&'a mut Context<I>) -> FlowFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}
