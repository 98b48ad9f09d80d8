//! # xrpc-server: Procedure Registry and Request Pipeline
//!
//! Declare a typed procedure once; get an HTTP endpoint on axum and a spec
//! entry that client generators consume.
//!
//! ```rust,ignore
//! use xrpc_server::{App, AppConfig, Procedure, Reply};
//! use xrpc_validation::{number, Validator};
//!
//! let mut app = App::new(AppConfig::new("Post Service", "http://localhost:9090"));
//! app.router("post", [
//!     Procedure::<ListPostInput, Vec<Post>>::new("list")
//!         .input(Validator::new().field("limit", number().max(10)))
//!         .query(|ctx| async move { Ok(Reply::ok(list_posts(&ctx.input))) }),
//! ])?;
//! app.serve().await?;
//! ```
//!
//! ## Request Pipeline
//!
//! read payload → validate → decode → root interceptors → procedure
//! interceptors → handler. Interceptors are async and resolve to a [`Flow`]:
//! `Continue`, `Advise` (record and go on), `Halt` (answer with the error) or
//! `Respond` (answer with a body).
//!
//! ```rust,ignore
//! app.intercept(|scope| Box::pin(async move {
//!     let sessions = match scope.service::<Sessions>() {
//!         Ok(sessions) => sessions,
//!         Err(err) => return Flow::Halt(err),
//!     };
//!     match sessions.lookup(scope.header("authorization")).await {
//!         Some(_) => Flow::Continue,
//!         None => Flow::halt(XrpcError::unauthorized("invalid session")),
//!     }
//! }));
//! ```
//!
//! ## Error Envelope
//!
//! Every error answers `{"detail": ...}` with its status. Binding failures
//! and validation failures are 400; validation details are the alias-keyed
//! message map, one entry per failing field.
//!
//! ## Crate Policy
//!
//! - One [`Context`] per request. Locals write to a request overlay over an
//!   immutable snapshot, so requests never share mutable state.
//! - The spec path of a procedure is always its bound router path.
//! - No `panic!()` or `.unwrap()` outside tests.

mod bind;

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod flow;
pub mod inject;
pub mod locals;
pub mod procedure;
pub mod reply;

pub use app::App;
pub use config::{AppConfig, DEFAULT_BODY_LIMIT};
pub use context::{Context, RequestScope};
pub use error::{RegistrationError, ServeError, XrpcError};
pub use flow::{interceptor, Flow, FlowFuture, Interceptor, RootInterceptor};
pub use inject::{InjectError, Injector};
pub use locals::Locals;
pub use procedure::{Endpoint, Input, Output, Procedure};
pub use reply::Reply;

pub use xrpc_core::{ProcedureKind, Shape, Spec};
pub use xrpc_validation::Validator;
