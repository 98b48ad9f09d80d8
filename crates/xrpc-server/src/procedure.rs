//! # Procedures
//!
//! A [`Procedure`] collects everything one remote call needs: a path, an
//! optional record validator, procedure interceptors and finally a handler.
//! `query` and `mutation` close the builder into an [`Endpoint`], which
//! [`App::mount`] turns into a router binding and a spec entry.
//!
//! Request pipeline, in order:
//!
//! 1. read the payload (query string or JSON body) with keys normalized
//! 2. validate the payload, if a validator is attached
//! 3. decode the typed input
//! 4. root interceptors
//! 5. procedure interceptors
//! 6. handler
//!
//! Validation runs on the payload rather than the decoded input, so a
//! missing required member is reported per field instead of failing decode.
//!
//! [`App::mount`]: crate::App::mount

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use xrpc_core::{normalize_path, ProcedureKind, Shape, TypeDescriptor};
use xrpc_validation::Validator;

use crate::bind::{decode, read_json, read_query};
use crate::context::{Context, RequestScope};
use crate::error::XrpcError;
use crate::flow::{FlowFuture, Interceptor, RootInterceptor};
use crate::inject::Injector;
use crate::locals::Locals;
use crate::reply::Reply;

type HandlerFuture<O> = Pin<Box<dyn Future<Output = Result<Reply<O>, XrpcError>> + Send>>;
type HandlerFn<I, O> = Arc<dyn Fn(Context<I>) -> HandlerFuture<O> + Send + Sync>;
type Install = Box<dyn FnOnce(Mount) -> MethodRouter + Send>;

/// Bounds every procedure input satisfies.
pub trait Input: Shape + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Input for T where T: Shape + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Bounds every procedure output satisfies.
pub trait Output: Shape + Serialize + Send + 'static {}

impl<T> Output for T where T: Shape + Serialize + Send + 'static {}

/// What the app shares with a procedure when mounting it.
pub(crate) struct Mount {
    pub path: String,
    pub locals: Arc<BTreeMap<String, Value>>,
    pub injector: Arc<Injector>,
    pub root: Arc<[RootInterceptor]>,
}

/// Builder for one typed procedure.
pub struct Procedure<I, O> {
    name: String,
    validator: Option<Validator>,
    interceptors: Vec<Interceptor<I>>,
    _output: PhantomData<fn() -> O>,
}

impl<I: Input, O: Output> Procedure<I, O> {
    /// Start a procedure; `name` is normalized to `/name/`.
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_path(name),
            validator: None,
            interceptors: Vec::new(),
            _output: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a record validator. `None` leaves the procedure unvalidated.
    pub fn input(mut self, validator: impl Into<Option<Validator>>) -> Self {
        if let Some(validator) = validator.into() {
            self.validator = Some(validator);
        }
        self
    }

    /// Append an interceptor. It returns a boxed future borrowing the
    /// context: `|ctx| Box::pin(async move { .. })`, or `Flow::ready()`
    /// when nothing is awaited.
    pub fn intercept<F>(mut self, interceptor: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<I>) -> FlowFuture<'a> + Send + Sync + 'static,
    {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Append several interceptors, keeping their order.
    pub fn intercept_all(mut self, interceptors: impl IntoIterator<Item = Interceptor<I>>) -> Self {
        self.interceptors.extend(interceptors);
        self
    }

    /// Finish as a read procedure bound to GET.
    pub fn query<F, Fut>(self, handler: F) -> Endpoint
    where
        F: Fn(Context<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply<O>, XrpcError>> + Send + 'static,
    {
        self.finish(ProcedureKind::Query, handler)
    }

    /// Finish as a write procedure bound to POST.
    pub fn mutation<F, Fut>(self, handler: F) -> Endpoint
    where
        F: Fn(Context<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply<O>, XrpcError>> + Send + 'static,
    {
        self.finish(ProcedureKind::Mutation, handler)
    }

    fn finish<F, Fut>(self, kind: ProcedureKind, handler: F) -> Endpoint
    where
        F: Fn(Context<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply<O>, XrpcError>> + Send + 'static,
    {
        let handler: HandlerFn<I, O> =
            Arc::new(move |ctx: Context<I>| -> HandlerFuture<O> { Box::pin(handler(ctx)) });
        let input = I::descriptor();
        let output = O::descriptor();
        let bind_descriptor = input.clone();
        let Procedure {
            name,
            validator,
            interceptors,
            ..
        } = self;

        let install: Install = Box::new(move |mount: Mount| {
            let pipeline = Arc::new(Pipeline {
                kind,
                path: mount.path,
                input: bind_descriptor,
                validator,
                root: mount.root,
                interceptors,
                handler,
                locals: mount.locals,
                injector: mount.injector,
            });
            let serve = move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                let pipeline = Arc::clone(&pipeline);
                async move { pipeline.run(method, uri, headers, body).await }
            };
            match kind {
                ProcedureKind::Query => get(serve),
                ProcedureKind::Mutation => post(serve),
            }
        });

        Endpoint {
            name,
            kind,
            input,
            output,
            install,
        }
    }
}

/// A finished procedure, ready to mount.
pub struct Endpoint {
    name: String,
    kind: ProcedureKind,
    input: TypeDescriptor,
    output: TypeDescriptor,
    install: Install,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Endpoint {
    /// Normalized procedure name, before any router prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProcedureKind {
        self.kind
    }

    pub fn input(&self) -> &TypeDescriptor {
        &self.input
    }

    pub fn output(&self) -> &TypeDescriptor {
        &self.output
    }

    pub(crate) fn into_parts(self) -> (ProcedureKind, TypeDescriptor, TypeDescriptor, Install) {
        (self.kind, self.input, self.output, self.install)
    }
}

struct Pipeline<I, O> {
    kind: ProcedureKind,
    path: String,
    input: TypeDescriptor,
    validator: Option<Validator>,
    root: Arc<[RootInterceptor]>,
    interceptors: Vec<Interceptor<I>>,
    handler: HandlerFn<I, O>,
    locals: Arc<BTreeMap<String, Value>>,
    injector: Arc<Injector>,
}

impl<I: Input, O: Output> Pipeline<I, O> {
    async fn run(&self, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
        let raw = match self.kind {
            ProcedureKind::Query => read_query(&self.input, uri.query()),
            ProcedureKind::Mutation => read_json(&self.input, &body),
        };
        let raw = match raw {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(path = %self.path, detail = %err.detail(), "input binding failed");
                return err.into_response();
            }
        };

        if let Some(validator) = &self.validator {
            if let Err(errors) = validator.validate_value(&self.input, &raw) {
                tracing::debug!(path = %self.path, %errors, "input validation failed");
                return XrpcError::validation(errors).into_response();
            }
        }

        let input = match decode::<I>(&self.input, &raw) {
            Ok(input) => input,
            Err(err) => {
                tracing::debug!(path = %self.path, detail = %err.detail(), "input binding failed");
                return err.into_response();
            }
        };

        let scope = RequestScope::new(
            method,
            uri,
            headers,
            raw,
            Locals::new(Arc::clone(&self.locals)),
            Arc::clone(&self.injector),
        );
        let mut ctx = Context::new(input, scope);

        for interceptor in self.root.iter() {
            let flow = interceptor(ctx.scope_mut()).await;
            if let Some(response) = flow.settle(&self.path, ctx.scope_mut()) {
                return with_headers(response, ctx.take_response_headers());
            }
        }
        for interceptor in &self.interceptors {
            let flow = interceptor(&mut ctx).await;
            if let Some(response) = flow.settle(&self.path, ctx.scope_mut()) {
                return with_headers(response, ctx.take_response_headers());
            }
        }

        let headers = ctx.take_response_headers();
        let response = match (self.handler)(ctx).await {
            Ok(reply) => reply.into_response(),
            Err(err) => err.into_response(),
        };
        with_headers(response, headers)
    }
}

fn with_headers(mut response: Response, headers: HeaderMap) -> Response {
    response.headers_mut().extend(headers);
    response
}
